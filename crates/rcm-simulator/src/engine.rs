//! Daily production engine.
//!
//! Every simulated day draws from its own `ChaCha8Rng`, seeded from the base
//! seed and the day ordinal. No generator state survives between days, so a
//! day's result does not depend on which other days were simulated or in
//! what order.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use geo::Point;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rcm_domain::geometry::uniform;
use rcm_domain::{
    DailySimulationResult, EventType, ShotStatus, SimulationConfig, SimulationEvent, SourcePoint,
    SurveyArea, WeatherState,
};
use serde_json::json;
use tracing::{debug, debug_span, info};

use crate::error::Result;

/// Hour of day the workday window opens.
pub const WORKDAY_START_HOUR: i64 = 6;

/// Candidate draws before rejection sampling falls back to the bounding-box corner.
pub const SAMPLING_ATTEMPTS: usize = 10;

/// Half-width of the per-axis position jitter around a source, in degrees.
pub const POSITION_JITTER_DEG: f64 = 0.0005;

/// A shot is repeated when its status draw is at or below this value.
pub const REPEAT_THRESHOLD: f64 = 0.02;

/// Shortest downtime a weather delay can cause, in hours.
pub const MIN_WEATHER_DELAY_HOURS: f64 = 0.5;

/// Upper bound (inclusive) of auto-generated base seeds.
pub const MAX_AUTO_SEED: u64 = 1_000_000;

/// Seeded production simulator bound to one survey configuration.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    config: SimulationConfig,
    area: SurveyArea,
    seed: u64,
}

impl SimulationEngine {
    /// Bind `config` and a base seed. Without an explicit seed one is drawn
    /// once from `0..=1_000_000` and kept for the engine's lifetime.
    pub fn new(
        config: SimulationConfig,
        seed: Option<u64>,
    ) -> std::result::Result<Self, rcm_domain::GeometryError> {
        let area = config.boundary().to_polygon()?;
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen_range(0..=MAX_AUTO_SEED));

        info!(
            project = %config.project().name,
            seed,
            sources = config.sources().len(),
            receivers = config.receivers().len(),
            repaired_boundary = area.was_repaired(),
            "Simulation engine ready"
        );

        Ok(Self { config, area, seed })
    }

    /// Validate a JSON document from `reader` and bind it.
    pub fn from_reader(reader: impl Read, seed: Option<u64>) -> Result<Self> {
        let config = SimulationConfig::from_reader(reader)?;
        Ok(Self::new(config, seed)?)
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub const fn survey_area(&self) -> &SurveyArea {
        &self.area
    }

    /// Fresh generator for `day`; identical on every call.
    #[must_use]
    pub fn day_rng(&self, day: NaiveDate) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(day_seed(self.seed, day))
    }

    /// Simulate `days` consecutive dates from `start`, in ascending order.
    pub fn simulate_range(&self, start: NaiveDate, days: u32) -> Vec<DailySimulationResult> {
        let results: Vec<_> = self.iter_range(start, days).collect();

        info!(
            start = %start,
            days = results.len(),
            executed_shots = results.iter().map(|r| u64::from(r.executed_shots)).sum::<u64>(),
            "Range simulated"
        );

        results
    }

    /// Lazy form of [`Self::simulate_range`]; each item is computed only when
    /// pulled, so a caller can stop between days.
    pub fn iter_range(
        &self,
        start: NaiveDate,
        days: u32,
    ) -> impl Iterator<Item = DailySimulationResult> + '_ {
        start
            .iter_days()
            .take(days as usize)
            .map(move |day| self.simulate_day(day))
    }

    /// Simulate a single date.
    pub fn simulate_day(&self, day: NaiveDate) -> DailySimulationResult {
        let _span = debug_span!("simulate_day", %day).entered();
        let params = self.config.parameters();
        let mut rng = self.day_rng(day);

        let (downtime_hours, weather_state) =
            if rng.r#gen::<f64>() < params.weather_downtime_probability {
                let hours = uniform(
                    &mut rng,
                    MIN_WEATHER_DELAY_HOURS,
                    params.max_weather_delay_hours,
                );
                (hours, WeatherState::WeatherDelay)
            } else {
                (0.0, WeatherState::Clear)
            };

        let mut uptime_ratio =
            ((params.hours_per_day - downtime_hours) / params.hours_per_day).max(0.0);
        uptime_ratio *= 1.0 - params.ambient_noise_factor * rng.r#gen::<f64>();

        // Instrument failures cut shot output only; receiver deployment is unaffected.
        let equipment_factor = 1.0 - params.equipment_failure_rate * rng.r#gen::<f64>();

        let crew_capacity = params.crew_shot_capacity();
        let executed_shots = round_count(
            f64::from(params.daily_shot_target).min(crew_capacity)
                * uptime_ratio
                * equipment_factor,
        );

        #[allow(clippy::cast_precision_loss)]
        let receiver_capacity = params.crew_receiver_capacity() as f64;
        let active_receivers = round_count(
            f64::from(params.daily_receiver_target).min(receiver_capacity) * uptime_ratio,
        );

        let events = if executed_shots > 0 {
            self.shot_events(day, executed_shots, &mut rng)
        } else {
            Vec::new()
        };

        debug!(
            weather = %weather_state,
            downtime_hours,
            uptime_ratio,
            equipment_factor,
            executed_shots,
            active_receivers,
            "Day simulated"
        );

        DailySimulationResult {
            date: day,
            planned_shots: params.daily_shot_target,
            executed_shots,
            planned_receivers: params.daily_receiver_target,
            active_receivers,
            uptime_ratio,
            weather_state,
            events,
        }
    }

    /// Spread `count` shots over the workday window, drawing from `rng` in
    /// event order.
    fn shot_events(&self, day: NaiveDate, count: u32, rng: &mut ChaCha8Rng) -> Vec<SimulationEvent> {
        let params = self.config.parameters();
        let sources = self.config.sources();
        let crew_count = params.crew_count as usize;

        let base_time = workday_start(day);
        let interval = params.hours_per_day * 60.0 / f64::from(count.max(1));

        (0..count as usize)
            .map(|idx| {
                #[allow(clippy::cast_precision_loss)]
                let minute_offset = idx as f64 * interval + uniform(rng, 0.0, interval);
                let source = if sources.is_empty() {
                    None
                } else {
                    sources.get(idx % sources.len())
                };
                let position = self.shot_position(source, rng);
                let status = if rng.r#gen::<f64>() > REPEAT_THRESHOLD {
                    ShotStatus::Executed
                } else {
                    ShotStatus::Repeated
                };

                SimulationEvent {
                    event_time: base_time + minutes(minute_offset),
                    event_type: EventType::Shot,
                    longitude: position.x(),
                    latitude: position.y(),
                    source_id: source.map(|s| s.source_id.clone()),
                    status,
                    attributes: BTreeMap::from([
                        ("sequence".to_string(), json!(idx + 1)),
                        ("crew".to_string(), json!(idx % crew_count + 1)),
                    ]),
                }
            })
            .collect()
    }

    /// Jitter around the assigned source, or sample inside the boundary.
    fn shot_position(&self, source: Option<&SourcePoint>, rng: &mut ChaCha8Rng) -> Point<f64> {
        match source {
            Some(source) => {
                let dx = uniform(rng, -POSITION_JITTER_DEG, POSITION_JITTER_DEG);
                let dy = uniform(rng, -POSITION_JITTER_DEG, POSITION_JITTER_DEG);
                Point::new(source.longitude + dx, source.latitude + dy)
            }
            None => self.area.sample_point(rng, SAMPLING_ATTEMPTS),
        }
    }
}

/// Proleptic Gregorian ordinal, 0001-01-01 being day 1.
#[must_use]
pub fn day_ordinal(day: NaiveDate) -> i64 {
    i64::from(day.num_days_from_ce())
}

/// Per-day seed keyed on `(base_seed, ordinal)`.
///
/// A SplitMix64 mix rather than a plain sum, so `(seed, day + 1)` and
/// `(seed + 1, day)` do not collide.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn day_seed(base_seed: u64, day: NaiveDate) -> u64 {
    splitmix64(splitmix64(base_seed) ^ day_ordinal(day) as u64)
}

const fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn workday_start(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::default()) + TimeDelta::hours(WORKDAY_START_HOUR)
}

/// Fractional minutes as a delta, rounded half-even to the microsecond.
#[allow(clippy::cast_possible_truncation)]
fn minutes(value: f64) -> TimeDelta {
    TimeDelta::microseconds((value * 60_000_000.0).round_ties_even() as i64)
}

/// Round half to even and saturate into `u32`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_count(value: f64) -> u32 {
    value.round_ties_even() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine(seed: u64) -> SimulationEngine {
        let config = SimulationConfig::from_document(&json!({
            "project": { "name": "Unit", "location": "Nowhere" },
            "boundary": { "coordinates": [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] },
            "sources": [],
            "receivers": [],
            "parameters": { "daily_shot_target": 40 }
        }))
        .unwrap();
        SimulationEngine::new(config, Some(seed)).unwrap()
    }

    #[test]
    fn test_day_ordinal_matches_proleptic_calendar() {
        assert_eq!(day_ordinal(NaiveDate::from_ymd_opt(1, 1, 1).unwrap()), 1);
        assert_eq!(day_ordinal(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 738_886);
    }

    #[test]
    fn test_day_seed_is_keyed() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let next = day.succ_opt().unwrap();
        assert_eq!(day_seed(9, day), day_seed(9, day));
        assert_ne!(day_seed(9, next), day_seed(10, day));
        assert_ne!(day_seed(9, day), day_seed(9, next));
    }

    #[test]
    fn test_auto_seed_in_range() {
        let config = engine(0).config().clone();
        let engine = SimulationEngine::new(config, None).unwrap();
        assert!(engine.seed() <= MAX_AUTO_SEED);
    }

    #[test]
    fn test_minutes_rounding() {
        assert_eq!(minutes(1.5), TimeDelta::seconds(90));
        assert_eq!(minutes(0.000_000_01), TimeDelta::microseconds(1));
    }

    #[test]
    fn test_workday_starts_at_six() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(workday_start(day).to_string(), "2024-02-29 06:00:00");
    }

    #[test]
    fn test_iter_range_can_stop_early() {
        let engine = engine(5);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let first_two: Vec<_> = engine.iter_range(start, 365).take(2).collect();
        assert_eq!(first_two, engine.simulate_range(start, 2));
    }
}
