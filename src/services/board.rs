use crate::core::{
    apply_toggle, count_by_event, filters::filter_events, plan_toggle, CategorySelector,
    CheckinGate, CheckinOutcome, GeolocationError, InterestChange, RelationSet,
};
use crate::models::{
    CheckinSummary, DateRange, DateRangeError, Event, EventView, GeoPoint, NewEvent, RelationKey,
    UserIdentity,
};
use crate::services::backend::{BackendClient, BackendError};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};

/// Errors surfaced by board operations
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Sign in to continue")]
    NotSignedIn,

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    #[error(transparent)]
    Location(#[from] GeolocationError),

    #[error("Backend request failed: {0}")]
    Backend(#[from] BackendError),
}

/// Source of the caller's current position
pub trait LocationSensor {
    fn current_position(&self) -> impl Future<Output = Result<GeoPoint, GeolocationError>> + Send;
}

/// A reading the client already took and reported with its request
#[derive(Debug, Clone, Copy)]
pub struct ReportedLocation(pub Result<GeoPoint, GeolocationError>);

impl LocationSensor for ReportedLocation {
    async fn current_position(&self) -> Result<GeoPoint, GeolocationError> {
        self.0
    }
}

/// Tunables for the board
#[derive(Debug, Clone, Copy)]
pub struct BoardSettings {
    pub checkin_radius_m: f64,
    pub location_timeout: Duration,
    pub default_window_days: u32,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            checkin_radius_m: crate::core::CHECKIN_RADIUS_M,
            location_timeout: Duration::from_secs(10),
            default_window_days: 7,
        }
    }
}

/// In-memory view model, always replaced as a whole
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub events: Vec<Event>,
    pub interest_counts: HashMap<String, u32>,
    /// Interest pairs of every user
    pub interests: RelationSet,
    /// Check-in pairs of the signed-in user
    pub checkins: RelationSet,
}

impl ViewState {
    pub fn event(&self, event_id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == event_id)
    }

    pub fn interest_count(&self, event_id: &str) -> u32 {
        self.interest_counts.get(event_id).copied().unwrap_or(0)
    }

    fn view_of(&self, event: &Event, user_id: Option<&str>) -> EventView {
        let related = |set: &RelationSet| {
            user_id
                .map(|u| set.contains(&RelationKey::new(u, event.id.clone())))
                .unwrap_or(false)
        };

        EventView {
            event: event.clone(),
            interest_count: self.interest_count(&event.id),
            interested: related(&self.interests),
            checked_in: related(&self.checkins),
        }
    }
}

/// Result of an interest toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestState {
    pub interested: bool,
    pub count: u32,
}

/// Orchestrates the core computations against the backend
///
/// Local state only changes after the backend has confirmed a write.
/// Reloads and confirmed writes are serialized through `writes`.
pub struct Board {
    backend: Arc<BackendClient>,
    gate: CheckinGate,
    settings: BoardSettings,
    view: RwLock<Arc<ViewState>>,
    writes: Mutex<()>,
}

impl Board {
    pub fn new(backend: Arc<BackendClient>, settings: BoardSettings) -> Self {
        Self {
            backend,
            gate: CheckinGate::new(settings.checkin_radius_m),
            settings,
            view: RwLock::new(Arc::new(ViewState::default())),
            writes: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub async fn snapshot(&self) -> Arc<ViewState> {
        self.view.read().await.clone()
    }

    /// Reload everything from the backend for `identity`
    pub async fn refresh(&self, identity: Option<&UserIdentity>) -> Result<(), BoardError> {
        let _writes = self.writes.lock().await;

        let events = self.backend.list_events().await?;
        let interests: RelationSet = self
            .backend
            .list_interests()
            .await?
            .iter()
            .map(|r| r.key())
            .collect();
        let checkins: RelationSet = match identity {
            Some(user) => self
                .backend
                .list_checkins(&user.user_id)
                .await?
                .iter()
                .map(|r| r.key())
                .collect(),
            None => RelationSet::new(),
        };

        let next = ViewState {
            interest_counts: count_by_event(interests.iter()),
            events,
            interests,
            checkins,
        };

        tracing::info!(
            "View refreshed: {} events, {} interests, {} check-ins",
            next.events.len(),
            next.interests.len(),
            next.checkins.len()
        );

        *self.view.write().await = Arc::new(next);
        Ok(())
    }

    /// Reload the view on every identity change until the hub goes away
    pub async fn follow_session(self: Arc<Self>, mut rx: watch::Receiver<Option<UserIdentity>>) {
        while rx.changed().await.is_ok() {
            let identity = rx.borrow_and_update().clone();
            if let Err(e) = self.refresh(identity.as_ref()).await {
                tracing::warn!("Failed to refresh view after session change: {}", e);
            }
        }
    }

    /// Filtered events for the map, in view order
    pub async fn visible_events(
        &self,
        identity: Option<&UserIdentity>,
        range: &DateRange,
        selector: &CategorySelector,
        today: NaiveDate,
    ) -> (Vec<EventView>, usize) {
        let view = self.snapshot().await;
        let user_id = identity.map(|u| u.user_id.as_str());

        let visible = filter_events(&view.events, range, selector, today)
            .into_iter()
            .map(|event| view.view_of(event, user_id))
            .collect();

        (visible, view.events.len())
    }

    /// Parse listing bounds, falling back to the default window
    pub fn date_range(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
    ) -> Result<DateRange, BoardError> {
        Ok(DateRange::from_args(from, to, today, self.settings.default_window_days)?)
    }

    /// Persist a new event, then add it to the view
    pub async fn create_event(
        &self,
        identity: Option<&UserIdentity>,
        event: NewEvent,
    ) -> Result<Event, BoardError> {
        let user = identity.ok_or(BoardError::NotSignedIn)?;
        if !event.position.is_valid() {
            return Err(BoardError::InvalidEvent("position out of range".to_string()));
        }

        let _writes = self.writes.lock().await;
        let created = self.backend.create_event(event).await?;

        let mut view = self.view.write().await;
        let mut next = ViewState::clone(&view);
        next.events.push(created.clone());
        *view = Arc::new(next);

        tracing::info!("User {} created event {} ({})", user.user_id, created.id, created.title);
        Ok(created)
    }

    /// Flip the user's interest in an event
    pub async fn toggle_interest(
        &self,
        identity: Option<&UserIdentity>,
        event_id: &str,
    ) -> Result<InterestState, BoardError> {
        let user = identity.ok_or(BoardError::NotSignedIn)?;
        let key = RelationKey::new(user.user_id.clone(), event_id);
        let _writes = self.writes.lock().await;

        let change = {
            let view = self.snapshot().await;
            if view.event(event_id).is_none() {
                return Err(BoardError::EventNotFound(event_id.to_string()));
            }
            plan_toggle(&view.interests, &key)
        };

        match change {
            InterestChange::Add => match self.backend.create_interest(&key).await {
                Ok(()) | Err(BackendError::Conflict(_)) => {}
                Err(e) => return Err(e.into()),
            },
            InterestChange::Remove => match self.backend.delete_interest(&key).await {
                Ok(()) | Err(BackendError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            },
        }

        let mut view = self.view.write().await;
        let mut next = ViewState::clone(&view);
        let count = apply_toggle(&mut next.interests, &mut next.interest_counts, &key, change);
        let interested = next.interests.contains(&key);
        *view = Arc::new(next);

        tracing::info!(
            "User {} {} interest in {} (count {})",
            user.user_id,
            if interested { "registered" } else { "withdrew" },
            event_id,
            count
        );

        Ok(InterestState { interested, count })
    }

    /// Attempt a proximity-gated check-in
    ///
    /// An existing check-in short-circuits before the sensor is asked.
    pub async fn check_in<S: LocationSensor>(
        &self,
        identity: Option<&UserIdentity>,
        event_id: &str,
        sensor: &S,
    ) -> Result<CheckinOutcome, BoardError> {
        let user = identity.ok_or(BoardError::NotSignedIn)?;
        let key = RelationKey::new(user.user_id.clone(), event_id);

        let view = self.snapshot().await;
        let position = view
            .event(event_id)
            .ok_or_else(|| BoardError::EventNotFound(event_id.to_string()))?
            .position;

        let timeout = self.settings.location_timeout;
        let outcome = self
            .gate
            .attempt(&view.checkins, &key, position, move || async move {
                tokio::time::timeout(timeout, sensor.current_position())
                    .await
                    .unwrap_or(Err(GeolocationError::Timeout))
            })
            .await?;

        let distance_m = match outcome {
            CheckinOutcome::CheckedIn { distance_m } => distance_m,
            CheckinOutcome::AlreadyCheckedIn => {
                tracing::debug!("User {} already checked in to {}", user.user_id, event_id);
                return Ok(outcome);
            }
            CheckinOutcome::TooFar { distance_m, .. } => {
                tracing::info!("User {} too far from {} ({:.0} m)", user.user_id, event_id, distance_m);
                return Ok(outcome);
            }
        };

        let _writes = self.writes.lock().await;
        let outcome = match self.backend.create_checkin(&key).await {
            Ok(_) => outcome,
            Err(BackendError::Conflict(_)) => CheckinOutcome::AlreadyCheckedIn,
            Err(e) => return Err(e.into()),
        };

        let mut view = self.view.write().await;
        let mut next = ViewState::clone(&view);
        next.checkins.insert(key);
        *view = Arc::new(next);

        tracing::info!(
            "User {} checked in to {} ({:.0} m away)",
            user.user_id,
            event_id,
            distance_m
        );
        Ok(outcome)
    }

    /// The user's check-ins joined with event summaries
    pub async fn checkin_history(
        &self,
        identity: Option<&UserIdentity>,
    ) -> Result<Vec<CheckinSummary>, BoardError> {
        let user = identity.ok_or(BoardError::NotSignedIn)?;
        Ok(self.backend.checkin_history(&user.user_id).await?)
    }
}
