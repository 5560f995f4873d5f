use crate::core::relation::RelationSet;
use crate::models::RelationKey;
use std::collections::HashMap;

/// Change an interest toggle will make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestChange {
    Add,
    Remove,
}

/// Decide which way a toggle goes for `key`
#[inline]
pub fn plan_toggle(interests: &RelationSet, key: &RelationKey) -> InterestChange {
    if interests.contains(key) {
        InterestChange::Remove
    } else {
        InterestChange::Add
    }
}

/// Apply a confirmed change to the relation and the cached per-event counts
///
/// Returns the new count for the event. Removal never takes a count below zero.
pub fn apply_toggle(
    interests: &mut RelationSet,
    counts: &mut HashMap<String, u32>,
    key: &RelationKey,
    change: InterestChange,
) -> u32 {
    let count = counts.entry(key.event_id.clone()).or_insert(0);
    match change {
        InterestChange::Add => {
            if interests.insert(key.clone()) {
                *count += 1;
            }
        }
        InterestChange::Remove => {
            if interests.remove(key) {
                *count = count.saturating_sub(1);
            }
        }
    }
    *count
}

/// Plan and apply in one step, for callers with no remote side
pub fn toggle_interest(
    interests: &mut RelationSet,
    counts: &mut HashMap<String, u32>,
    key: &RelationKey,
) -> (InterestChange, u32) {
    let change = plan_toggle(interests, key);
    let count = apply_toggle(interests, counts, key, change);
    (change, count)
}

/// Per-event interest totals from a full listing of records
pub fn count_by_event<'a, I>(keys: I) -> HashMap<String, u32>
where
    I: IntoIterator<Item = &'a RelationKey>,
{
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(key.event_id.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_returns_to_start() {
        let mut interests = RelationSet::new();
        let mut counts = HashMap::new();
        let key = RelationKey::new("u1", "e1");

        let (change, count) = toggle_interest(&mut interests, &mut counts, &key);
        assert_eq!(change, InterestChange::Add);
        assert_eq!(count, 1);
        assert!(interests.contains(&key));

        let (change, count) = toggle_interest(&mut interests, &mut counts, &key);
        assert_eq!(change, InterestChange::Remove);
        assert_eq!(count, 0);
        assert!(!interests.contains(&key));
    }

    #[test]
    fn test_count_floored_at_zero() {
        let key = RelationKey::new("u1", "e1");
        let mut interests: RelationSet = [key.clone()].into_iter().collect();
        // Stale cache: the relation says present but the count never saw it
        let mut counts = HashMap::new();

        let count = apply_toggle(&mut interests, &mut counts, &key, InterestChange::Remove);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_other_users_unaffected() {
        let mut interests: RelationSet = [RelationKey::new("u2", "e1")].into_iter().collect();
        let mut counts = HashMap::from([("e1".to_string(), 1)]);
        let key = RelationKey::new("u1", "e1");

        let (change, count) = toggle_interest(&mut interests, &mut counts, &key);
        assert_eq!(change, InterestChange::Add);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_count_by_event() {
        let keys = vec![
            RelationKey::new("u1", "e1"),
            RelationKey::new("u2", "e1"),
            RelationKey::new("u1", "e2"),
        ];
        let counts = count_by_event(&keys);
        assert_eq!(counts["e1"], 2);
        assert_eq!(counts["e2"], 1);
    }
}
