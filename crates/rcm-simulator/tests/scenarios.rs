mod support;

use geo::Point;
use rcm_domain::{ShotStatus, WeatherState};
use rcm_simulator::layer::{flatten_results, status_counts};
use serde_json::json;
use support::{date, document, engine, UNIT_SQUARE};

#[test]
fn clear_day_hits_target_exactly() {
    let doc = document(
        &UNIT_SQUARE,
        vec![json!({ "source_id": "VP-1", "name": "Vibe", "longitude": 0.0, "latitude": 0.0 })],
        json!({
            "crew_count": 1,
            "hours_per_day": 12.0,
            "shots_per_crew_hour": 10.0,
            "daily_shot_target": 100,
            "weather_downtime_probability": 0.0,
            "equipment_failure_rate": 0.0,
            "ambient_noise_factor": 0.0
        }),
    );

    for seed in [1_u64, 77, 4242] {
        let engine = engine(&doc, seed);
        assert!((engine.config().parameters().crew_shot_capacity() - 120.0).abs() < f64::EPSILON);

        let result = engine.simulate_day(date(2024, 5, 20));
        assert_eq!(result.weather_state, WeatherState::Clear);
        assert_eq!(result.uptime_ratio, 1.0);
        assert_eq!(result.executed_shots, 100);
        assert_eq!(result.events.len(), 100);
        for event in &result.events {
            assert_eq!(event.source_id.as_deref(), Some("VP-1"));
            assert!(matches!(event.status, ShotStatus::Executed | ShotStatus::Repeated));
            assert!(event.longitude.abs() <= 0.0005);
            assert!(event.latitude.abs() <= 0.0005);
            assert_eq!(event.crew(), Some(1));
        }
    }
}

#[test]
fn guaranteed_weather_stop_returns_normally() {
    let doc = document(
        &UNIT_SQUARE,
        vec![],
        json!({
            "hours_per_day": 12.0,
            "max_weather_delay_hours": 12.0,
            "weather_downtime_probability": 1.0
        }),
    );
    let engine = engine(&doc, 3);
    let params = engine.config().parameters().clone();

    for result in engine.simulate_range(date(2024, 11, 1), 30) {
        assert_eq!(result.weather_state, WeatherState::WeatherDelay);
        assert!(result.uptime_ratio <= 11.5 / 12.0);
        assert!(f64::from(result.executed_shots) <= f64::from(params.daily_shot_target) * 11.5 / 12.0 + 0.5);
        assert_eq!(result.events.len(), result.executed_shots as usize);
    }
}

#[test]
fn full_day_lost_to_weather_yields_no_events() {
    let doc = document(
        &UNIT_SQUARE,
        vec![],
        json!({
            "hours_per_day": 12.0,
            "max_weather_delay_hours": 1.0e12,
            "weather_downtime_probability": 1.0
        }),
    );
    let engine = engine(&doc, 3);

    for result in engine.simulate_range(date(2024, 11, 1), 30) {
        assert_eq!(result.uptime_ratio, 0.0);
        assert_eq!(result.executed_shots, 0);
        assert_eq!(result.active_receivers, 0);
        assert!(result.events.is_empty());
        assert!(result.to_feature_collection().features.is_empty());
    }
}

#[test]
fn zero_target_is_an_empty_day_not_an_error() {
    let doc = document(&UNIT_SQUARE, vec![], json!({ "daily_shot_target": 0 }));
    let result = engine(&doc, 12).simulate_day(date(2024, 1, 1));
    assert_eq!(result.executed_shots, 0);
    assert!(result.events.is_empty());
}

#[test]
fn sourceless_events_fall_inside_boundary() {
    let doc = document(
        &UNIT_SQUARE,
        vec![],
        json!({
            "crew_count": 2,
            "daily_shot_target": 150,
            "weather_downtime_probability": 0.0,
            "equipment_failure_rate": 0.0,
            "ambient_noise_factor": 0.0
        }),
    );
    let engine = engine(&doc, 2718);
    let area = engine.survey_area();

    let result = engine.simulate_day(date(2024, 7, 4));
    assert_eq!(result.events.len(), 150);
    for event in &result.events {
        assert!(event.source_id.is_none());
        assert!(area.contains(&Point::new(event.longitude, event.latitude)));
    }
}

#[test]
fn sourceless_events_in_sparse_boundary_use_fallback_corner() {
    // Thin diagonal sliver: almost every bounding-box candidate misses.
    let sliver = [[0.0, 0.0], [1.0, 1.0], [0.999_999, 1.0], [0.0, 0.0]];
    let doc = document(
        &sliver,
        vec![],
        json!({
            "daily_shot_target": 120,
            "weather_downtime_probability": 0.0,
            "equipment_failure_rate": 0.0,
            "ambient_noise_factor": 0.0
        }),
    );
    let engine = engine(&doc, 1);
    let area = engine.survey_area();
    let corner = area.fallback_point();
    assert_eq!(corner, Point::new(0.0, 0.0));

    let result = engine.simulate_day(date(2024, 7, 4));
    assert_eq!(result.events.len(), 120);
    let mut fallbacks = 0;
    for event in &result.events {
        let point = Point::new(event.longitude, event.latitude);
        if point == corner {
            fallbacks += 1;
        } else {
            assert!(area.contains(&point));
        }
    }
    assert!(fallbacks > 100);
}

#[test]
fn layer_export_never_shows_weather_delay_status() {
    let doc = document(
        &UNIT_SQUARE,
        vec![json!({ "source_id": "VP-1", "name": "Vibe", "longitude": 0.5, "latitude": 0.5 })],
        json!({ "weather_downtime_probability": 1.0, "daily_shot_target": 200 }),
    );
    let results = engine(&doc, 10).simulate_range(date(2024, 2, 1), 5);
    assert!(results.iter().all(|r| r.weather_state == WeatherState::WeatherDelay));

    let points = flatten_results(&results);
    let total: u32 = results.iter().map(|r| r.executed_shots).sum();
    assert_eq!(points.len(), total as usize);

    let counts = status_counts(&points);
    assert_eq!(counts["weather-delay"], 0);
    assert_eq!(counts["executed"] + counts["repeated"], points.len());
}

#[test]
fn longest_workday_stays_inside_the_window() {
    let doc = document(
        &UNIT_SQUARE,
        vec![],
        json!({
            "hours_per_day": 24.0,
            "daily_shot_target": 1,
            "weather_downtime_probability": 0.0,
            "equipment_failure_rate": 0.0,
            "ambient_noise_factor": 0.0
        }),
    );
    let start = date(2024, 1, 1);
    for result in engine(&doc, 9).simulate_range(start, 5) {
        assert_eq!(result.events.len(), 1);
        let open = result.date.and_hms_opt(6, 0, 0).unwrap();
        let close = open + chrono::TimeDelta::hours(24);
        let at = result.events[0].event_time;
        assert!(at >= open && at <= close);
    }
}

#[test]
fn oversized_workday_is_rejected_at_load() {
    let doc = document(&UNIT_SQUARE, vec![], json!({ "hours_per_day": 1.0e10, "daily_shot_target": 1 }));
    let err = rcm_domain::SimulationConfig::from_document(&doc).unwrap_err();
    assert_eq!(err.field(), Some("parameters.hours_per_day"));
}
