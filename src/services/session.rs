use crate::models::UserIdentity;
use tokio::sync::watch;

/// Current signed-in identity plus a change feed
///
/// Sign-in and sign-out publish on a watch channel; subscribers see every
/// transition after the value they last observed.
pub struct SessionHub {
    tx: watch::Sender<Option<UserIdentity>>,
}

impl SessionHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Snapshot of the current identity
    pub fn current(&self) -> Option<UserIdentity> {
        self.tx.borrow().clone()
    }

    pub fn sign_in(&self, identity: UserIdentity) {
        tracing::info!("User {} signed in", identity.user_id);
        self.tx.send_replace(Some(identity));
    }

    /// Returns the identity that was signed out, if any
    pub fn sign_out(&self) -> Option<UserIdentity> {
        let previous = self.tx.send_replace(None);
        if let Some(identity) = &previous {
            tracing::info!("User {} signed out", identity.user_id);
        }
        previous
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.tx.subscribe()
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str) -> UserIdentity {
        UserIdentity {
            user_id: id.to_string(),
            display_name: format!("User {}", id),
            email: format!("{}@example.com", id),
            avatar_url: None,
        }
    }

    #[test]
    fn test_sign_in_and_out() {
        let hub = SessionHub::new();
        assert!(hub.current().is_none());

        hub.sign_in(identity("u1"));
        assert_eq!(hub.current().unwrap().user_id, "u1");

        let previous = hub.sign_out();
        assert_eq!(previous.unwrap().user_id, "u1");
        assert!(hub.current().is_none());
        assert!(hub.sign_out().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let hub = SessionHub::new();
        let mut rx = hub.subscribe();

        hub.sign_in(identity("u1"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().user_id, "u1");

        hub.sign_out();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}
