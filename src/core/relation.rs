use crate::models::RelationKey;
use std::collections::HashSet;

/// Set of (user, event) pairs
///
/// Backs both the interest and the check-in relation. Presence is the only
/// state a pair carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationSet {
    pairs: HashSet<RelationKey>,
}

impl RelationSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, key: &RelationKey) -> bool {
        self.pairs.contains(key)
    }

    /// Returns false if the pair was already present
    pub fn insert(&mut self, key: RelationKey) -> bool {
        self.pairs.insert(key)
    }

    /// Returns false if the pair was absent
    pub fn remove(&mut self, key: &RelationKey) -> bool {
        self.pairs.remove(key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationKey> {
        self.pairs.iter()
    }
}

impl FromIterator<RelationKey> for RelationSet {
    fn from_iter<I: IntoIterator<Item = RelationKey>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_are_unique() {
        let mut set = RelationSet::new();
        assert!(set.insert(RelationKey::new("u1", "e1")));
        assert!(!set.insert(RelationKey::new("u1", "e1")));
        assert!(set.insert(RelationKey::new("u2", "e1")));
        assert_eq!(set.len(), 2);

        assert!(set.remove(&RelationKey::new("u1", "e1")));
        assert!(!set.remove(&RelationKey::new("u1", "e1")));
        assert!(!set.contains(&RelationKey::new("u1", "e1")));
        assert!(set.contains(&RelationKey::new("u2", "e1")));
    }

    #[test]
    fn test_collect_deduplicates() {
        let set: RelationSet = [
            RelationKey::new("u1", "e1"),
            RelationKey::new("u1", "e1"),
            RelationKey::new("u2", "e3"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().filter(|k| k.user_id == "u1").count(), 1);
    }
}
