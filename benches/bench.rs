// Criterion benchmarks for Scene Board

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scene_board::core::{filter_events, haversine_distance, CategorySelector, CheckinGate};
use scene_board::models::{Category, DateRange, Event, GeoPoint};

fn create_event(id: usize, start: NaiveDate) -> Event {
    let date = start + Duration::days((id % 21) as i64 - 3);
    Event {
        id: id.to_string(),
        title: format!("Event {}", id),
        location_name: "London".to_string(),
        date_time: date.and_hms_opt(18, 0, 0).unwrap(),
        description: String::new(),
        position: GeoPoint::new(51.5 + (id as f64 * 0.0001) % 0.1, -0.1),
        category: Category::ALL[id % Category::ALL.len()],
    }
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(51.5055),
                black_box(-0.0754),
                black_box(51.5063),
                black_box(-0.0760),
            )
        });
    });
}

fn bench_checkin_gate(c: &mut Criterion) {
    let gate = CheckinGate::default();
    let event = GeoPoint::new(51.5055, -0.0754);
    let current = GeoPoint::new(51.5060, -0.0750);

    c.bench_function("checkin_gate_evaluate", |b| {
        b.iter(|| gate.evaluate(black_box(event), black_box(current)));
    });
}

fn bench_filter_events(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
    let range = DateRange::starting(today, 7);
    let selector = CategorySelector::Only("Music".to_string());

    let mut group = c.benchmark_group("filter_events");

    for event_count in [10, 100, 1000, 10000].iter() {
        let events: Vec<Event> = (0..*event_count).map(|i| create_event(i, today)).collect();

        group.bench_with_input(BenchmarkId::new("music_week", event_count), event_count, |b, _| {
            b.iter(|| filter_events(black_box(&events), &range, &selector, today).len());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_haversine_distance, bench_checkin_gate, bench_filter_events);

criterion_main!(benches);
