//! Report generation for simulated production ranges.

use std::cmp::Reverse;
use std::fmt::Write as _;

use chrono::NaiveDate;
use rcm_domain::{DailyKpis, DailySimulationResult, WeatherState};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use uuid::Uuid;

use crate::error::Result;

/// Production summary over a simulated date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeReport {
    pub run_id: Uuid,
    pub generated_at: String,
    pub project: String,
    pub seed: u64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days: usize,
    pub planned_shots: u64,
    pub executed_shots: u64,
    pub planned_receivers: u64,
    pub active_receivers: u64,
    pub shot_completion_pct: f64,
    pub mean_uptime_ratio: f64,
    pub uptime_std_dev: f64,
    pub weather_delay_days: usize,
    pub repeated_shots: usize,
    pub best_day: Option<DailyKpis>,
    pub worst_day: Option<DailyKpis>,
    pub daily: Vec<DailyKpis>,
}

impl RangeReport {
    /// Aggregate `results`, which are expected in ascending date order.
    pub fn from_results(project: &str, seed: u64, results: &[DailySimulationResult]) -> Self {
        let sum = |f: fn(&DailySimulationResult) -> u32| -> u64 {
            results.iter().map(|r| u64::from(f(r))).sum()
        };
        let planned_shots = sum(|r| r.planned_shots);
        let executed_shots = sum(|r| r.executed_shots);

        let uptimes: Vec<f64> = results.iter().map(|r| r.uptime_ratio).collect();
        let mean_uptime_ratio = if uptimes.is_empty() {
            0.0
        } else {
            uptimes.iter().mean()
        };
        let uptime_std_dev = if uptimes.len() < 2 {
            0.0
        } else {
            uptimes.iter().std_dev()
        };

        #[allow(clippy::cast_precision_loss)]
        let shot_completion_pct = if planned_shots == 0 {
            0.0
        } else {
            executed_shots as f64 / planned_shots as f64 * 100.0
        };

        Self {
            run_id: Uuid::new_v4(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            project: project.to_string(),
            seed,
            start_date: results.first().map(|r| r.date),
            end_date: results.last().map(|r| r.date),
            days: results.len(),
            planned_shots,
            executed_shots,
            planned_receivers: sum(|r| r.planned_receivers),
            active_receivers: sum(|r| r.active_receivers),
            shot_completion_pct,
            mean_uptime_ratio,
            uptime_std_dev,
            weather_delay_days: results
                .iter()
                .filter(|r| r.weather_state == WeatherState::WeatherDelay)
                .count(),
            repeated_shots: results.iter().map(DailySimulationResult::repeated_shots).sum(),
            best_day: results
                .iter()
                .max_by_key(|r| (r.executed_shots, Reverse(r.date)))
                .map(DailySimulationResult::kpis),
            worst_day: results
                .iter()
                .min_by_key(|r| (r.executed_shots, r.date))
                .map(DailySimulationResult::kpis),
            daily: results.iter().map(DailySimulationResult::kpis).collect(),
        }
    }

    /// Generate report as JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One `date: shots / receivers (weather)` entry per day, joined by `" | "`.
    #[must_use]
    pub fn summary_line(&self) -> String {
        self.daily
            .iter()
            .map(|k| {
                format!(
                    "{}: {} shots / {} receivers ({})",
                    k.date, k.executed_shots, k.active_receivers, k.weather_state
                )
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Generate Markdown report.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# RCM Daily Production Report\n\n");
        let _ = writeln!(md, "**Project:** {}  ", self.project);
        let _ = writeln!(md, "**Generated:** {}  ", self.generated_at);
        let _ = writeln!(md, "**Run:** {} (seed {})\n", self.run_id, self.seed);

        md.push_str("## Range Summary\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            let _ = writeln!(md, "| Period | {start} to {end} |");
        }
        let _ = writeln!(md, "| Days | {} |", self.days);
        let _ = writeln!(
            md,
            "| Shots | {} / {} planned |",
            self.executed_shots, self.planned_shots
        );
        let _ = writeln!(md, "| Shot Completion | {:.1}% |", self.shot_completion_pct);
        let _ = writeln!(
            md,
            "| Receivers | {} / {} planned |",
            self.active_receivers, self.planned_receivers
        );
        let _ = writeln!(
            md,
            "| Uptime | {:.3} (σ {:.3}) |",
            self.mean_uptime_ratio, self.uptime_std_dev
        );
        let _ = writeln!(md, "| Weather-Delay Days | {} |", self.weather_delay_days);
        let _ = writeln!(md, "| Repeated Shots | {} |", self.repeated_shots);
        if let Some(ref best) = self.best_day {
            let _ = writeln!(md, "| Best Day | {} ({} shots) |", best.date, best.executed_shots);
        }
        if let Some(ref worst) = self.worst_day {
            let _ = writeln!(md, "| Worst Day | {} ({} shots) |", worst.date, worst.executed_shots);
        }
        md.push('\n');

        if !self.daily.is_empty() {
            md.push_str("## Daily Production\n\n");
            md.push_str("| Date | Shots | Receivers | Uptime | Weather |\n");
            md.push_str("|------|-------|-----------|--------|---------|\n");
            for day in &self.daily {
                let _ = writeln!(
                    md,
                    "| {} | {} | {} | {:.3} | {} |",
                    day.date, day.executed_shots, day.active_receivers, day.uptime_ratio, day.weather_state
                );
            }
            md.push('\n');
        }

        md
    }
}
