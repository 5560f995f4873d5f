// Unit tests for Scene Board

use chrono::{NaiveDate, NaiveDateTime};
use scene_board::core::{
    distance::{distance_between, haversine_distance, longitude_offset_for},
    filters::filter_events,
    interest::toggle_interest,
    CategorySelector, CheckinGate, CheckinOutcome, GeolocationError, InterestChange, RelationSet,
};
use scene_board::models::{Category, DateRange, Event, GeoPoint, RelationKey};
use std::collections::HashMap;
use tokio_test::{assert_err, assert_ok};

fn create_event(id: &str, date_time: &str, category: Category) -> Event {
    Event {
        id: id.to_string(),
        title: format!("Event {}", id),
        location_name: "Covent Garden".to_string(),
        date_time: NaiveDateTime::parse_from_str(date_time, "%Y-%m-%d %H:%M").unwrap(),
        description: "Street performers".to_string(),
        position: GeoPoint::new(51.5115, -0.1236),
        category,
    }
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(51.5055, -0.0754, 51.5055, -0.0754);
    assert_eq!(distance, 0.0);
}

#[test]
fn test_haversine_distance_symmetric() {
    let points = [
        GeoPoint::new(51.5055, -0.0754),
        GeoPoint::new(51.5194, -0.1270),
        GeoPoint::new(-33.8688, 151.2093),
        GeoPoint::new(0.0, 179.9),
        GeoPoint::new(0.0, -179.9),
    ];

    for a in points {
        for b in points {
            let ab = distance_between(a, b);
            let ba = distance_between(b, a);
            assert!((ab - ba).abs() < 1e-6, "{:?} <-> {:?}: {} vs {}", a, b, ab, ba);
        }
    }
}

#[test]
fn test_one_degree_of_longitude_at_equator() {
    let distance = haversine_distance(0.0, 0.0, 0.0, 1.0);
    assert!((distance - 111_195.0).abs() < 50.0, "got {}", distance);
}

#[test]
fn test_agrees_with_geo_crate() {
    use geo::{point, HaversineDistance};

    let british_museum = point!(x: -0.1270, y: 51.5194);
    let hyde_park = point!(x: -0.1657, y: 51.5074);
    let reference = british_museum.haversine_distance(&hyde_park);

    let ours = haversine_distance(51.5194, -0.1270, 51.5074, -0.1657);
    // geo uses the mean radius 6371008.8 m; the results differ by that ratio only
    assert!((ours - reference).abs() / reference < 1e-5, "{} vs {}", ours, reference);
}

#[test]
fn test_gate_at_99_and_101_meters() {
    let gate = CheckinGate::default();
    let event = GeoPoint::new(51.5055, -0.0754);
    let at = |meters: f64| {
        GeoPoint::new(
            event.latitude,
            event.longitude + longitude_offset_for(event.latitude, meters),
        )
    };

    assert!(gate.evaluate(event, at(99.0)).is_permitted());
    assert!(!gate.evaluate(event, at(101.0)).is_permitted());
}

#[tokio::test]
async fn test_gate_attempt_records_nothing_itself() {
    let gate = CheckinGate::default();
    let checkins = RelationSet::new();
    let key = RelationKey::new("u1", "e1");
    let event = GeoPoint::new(51.5055, -0.0754);

    let outcome = assert_ok!(gate.attempt(&checkins, &key, event, move || async move { Ok(event) }).await);
    assert!(matches!(outcome, CheckinOutcome::CheckedIn { .. }));
    assert!(checkins.is_empty());

    let err = assert_err!(
        gate.attempt(&checkins, &key, event, || async { Err(GeolocationError::PermissionDenied) })
            .await
    );
    assert_eq!(err, GeolocationError::PermissionDenied);
}

#[test]
fn test_filter_excludes_yesterday() {
    let events = vec![
        create_event("yesterday", "2024-03-19 12:00", Category::Music),
        create_event("today", "2024-03-20 12:00", Category::Music),
    ];
    let range = DateRange::new(day("2024-03-20"), day("2024-03-27")).unwrap();

    let visible = filter_events(&events, &range, &CategorySelector::All, day("2024-03-20"));
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "today");
}

#[test]
fn test_filter_window_end() {
    let events = vec![
        create_event("april", "2024-04-01 10:00", Category::Community),
        create_event("inside", "2024-03-25 10:00", Category::Community),
    ];
    let range = DateRange::new(day("2024-03-20"), day("2024-03-27")).unwrap();

    let visible = filter_events(&events, &range, &CategorySelector::All, day("2024-03-20"));
    let ids: Vec<_> = visible.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["inside"]);
}

#[test]
fn test_filter_music_only() {
    let events = vec![
        create_event("1", "2024-03-21 10:00", Category::Music),
        create_event("2", "2024-03-21 10:00", Category::Sports),
        create_event("3", "2024-03-22 10:00", Category::Other),
        create_event("4", "2024-03-23 10:00", Category::Music),
    ];
    let range = DateRange::new(day("2024-03-20"), day("2024-03-27")).unwrap();
    let selector: CategorySelector = "Music".parse().unwrap();

    let visible = filter_events(&events, &range, &selector, day("2024-03-20"));
    assert!(visible.iter().all(|e| e.category.as_str() == "Music"));
    assert_eq!(visible.len(), 2);
}

#[test]
fn test_interest_toggle_cycle() {
    let mut interests = RelationSet::new();
    let mut counts: HashMap<String, u32> = HashMap::new();
    let key = RelationKey::new("u1", "e1");

    assert_eq!(toggle_interest(&mut interests, &mut counts, &key), (InterestChange::Add, 1));
    assert!(interests.contains(&key));

    assert_eq!(toggle_interest(&mut interests, &mut counts, &key), (InterestChange::Remove, 0));
    assert!(!interests.contains(&key));
}
