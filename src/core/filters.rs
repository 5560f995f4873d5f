use crate::models::{DateRange, Event};
use chrono::NaiveDate;
use std::str::FromStr;

/// Category constraint applied by the event filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelector {
    #[default]
    All,
    /// Case-sensitive match against the event's category name
    Only(String),
}

impl CategorySelector {
    #[inline]
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            CategorySelector::All => true,
            CategorySelector::Only(name) => event.category.as_str() == name,
        }
    }
}

impl FromStr for CategorySelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "all" => CategorySelector::All,
            other => CategorySelector::Only(other.to_string()),
        })
    }
}

/// Stage 1: drop events dated before today
#[inline]
pub fn is_upcoming(event: &Event, today: NaiveDate) -> bool {
    event.date() >= today
}

/// Stage 2: keep events inside the window, `to` running through 23:59:59
#[inline]
pub fn is_within_range(event: &Event, range: &DateRange) -> bool {
    range.contains(event.date_time)
}

/// Produce the visible subset of `events`, preserving input order
///
/// # Pipeline Stages
/// 1. Past events (before `today`)
/// 2. Outside the date window
/// 3. Category mismatch
pub fn filter_events<'a>(
    events: &'a [Event],
    range: &DateRange,
    selector: &CategorySelector,
    today: NaiveDate,
) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|event| is_upcoming(event, today))
        .filter(|event| is_within_range(event, range))
        .filter(|event| selector.matches(event))
        .collect()
}
