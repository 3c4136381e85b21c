// @file: sensor_gateway/src/core/models.rs
// @description: Centralized data structures for samples, measurements and subscriber commands.
// @author: LAS.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};


//
// TIME HELPER
//

pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}


//
// SAMPLE STRUCTURES
//

/// One parsed telegram: wire-keyed readings in telegram order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub sensor: String,
    pub timestamp_ns: u64,
    pub values: Vec<(String, f64)>,
}

impl Sample {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }
}


//
// MEASUREMENT STRUCTURES
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementMeta {
    pub units: String,
    pub description: String,
    pub sensor: String,
}

/// One published datum, the unit downstream collectors deal in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub value: f64,
    pub timestamp_ns: u64,
    pub meta: MeasurementMeta,
}


//
// STATUS STRUCTURES
//

/// Lifecycle marker, e.g. `exit.status = Unknown_Timeout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub sensor: String,
    pub name: String,
    pub value: String,
    pub timestamp_ns: u64,
}


//
// NETWORKING & COMMANDS
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SensorEvent {
    Sample(Sample),
    Measurement(Measurement),
    Status(StatusEvent),
}

impl SensorEvent {
    pub fn sensor(&self) -> &str {
        match self {
            SensorEvent::Sample(s) => &s.sensor,
            SensorEvent::Measurement(m) => &m.meta.sensor,
            SensorEvent::Status(s) => &s.sensor,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Deserialize)]
pub struct Command {
    pub action: CommandAction,
    pub channel: String, // Sensor label
}
