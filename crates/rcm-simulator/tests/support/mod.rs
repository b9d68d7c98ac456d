#![allow(dead_code)]

use chrono::NaiveDate;
use fake::faker::lorem::en::Word;
use fake::Fake;
use rcm_domain::SimulationConfig;
use rcm_simulator::SimulationEngine;
use serde_json::{json, Value};

pub const UNIT_SQUARE: [[f64; 2]; 5] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Source entries with generated names, laid out on a small grid.
pub fn sources(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "source_id": format!("SRC-{:03}", i + 1),
                "name": Word().fake::<String>(),
                "longitude": 56.0 + 0.01 * i as f64,
                "latitude": 20.0 + 0.005 * i as f64,
            })
        })
        .collect()
}

pub fn document(boundary: &[[f64; 2]], sources: Vec<Value>, parameters: Value) -> Value {
    json!({
        "project": { "name": "Property Survey", "location": "Test Block" },
        "boundary": { "name": "Test Area", "coordinates": boundary },
        "sources": sources,
        "receivers": [
            { "receiver_id": "R-1", "line_id": "L1", "longitude": 0.5, "latitude": 0.5 }
        ],
        "parameters": parameters,
    })
}

pub fn engine(document: &Value, seed: u64) -> SimulationEngine {
    let config = SimulationConfig::from_document(document).unwrap();
    SimulationEngine::new(config, Some(seed)).unwrap()
}

/// Default parameters, three sources, unit square boundary.
pub fn default_engine(seed: u64) -> SimulationEngine {
    engine(&document(&UNIT_SQUARE, sources(3), json!({})), seed)
}
