// @file: sensor_gateway/src/connectors/metek/telegram.rs
// @description: Pure telegram-to-sample parsing, independent of session I/O.
// @author: LAS.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::core::models::{now_ns, Sample};


//
// TOKEN PATTERNS
//

// Wire keys the instrument emits as parenthesized tokens, e.g. "(U -0.25)".
// "Seconds" is consumed for timestamping and never appears among the values.
pub const WIRE_KEYS: &[&str] = &["U", "V", "W", "TS"];
const SECONDS_KEY: &str = "Seconds";

lazy_static! {
    static ref TOKEN_PATTERNS: Vec<(&'static str, Regex)> = WIRE_KEYS
        .iter()
        .chain(std::iter::once(&SECONDS_KEY))
        .map(|key| {
            let pattern = format!(r"\({} ([-\d.]+)\)", key);
            (*key, Regex::new(&pattern).unwrap())
        })
        .collect();
}


//
// PARSE ENTRY POINT
//

/// Parses one telegram line into a Sample. Returns None when no known token
/// is present, which also keeps the line from feeding the session watchdog.
pub fn parse(line: &str, sensor: &str) -> Option<Sample> {
    let body = data_segments(line);

    let mut values: Vec<(String, f64)> = Vec::new();
    let mut seconds: Option<f64> = None;

    for (key, pattern) in TOKEN_PATTERNS.iter() {
        if let Some(cap) = pattern.captures(&body) {
            match cap[1].parse::<f64>() {
                Ok(v) if *key == SECONDS_KEY => seconds = Some(v),
                Ok(v) => values.push((key.to_string(), v)),
                Err(_) => debug!("Unparseable {} token in telegram: {}", key, &cap[1]),
            }
        }
    }

    if values.is_empty() {
        return None;
    }

    append_derived(&mut values);

    let timestamp_ns = match seconds {
        Some(s) => (s * 1e9) as u64,
        None => now_ns(),
    };

    Some(Sample {
        sensor: sensor.to_string(),
        timestamp_ns,
        values,
    })
}


//
// FRAME HANDLING
//

// Instrument data sits in segments 1..5 of the semicolon-separated record;
// segment 0 is a device-local prefix and trailing segments carry checksums.
fn data_segments(line: &str) -> String {
    line.trim_end()
        .split(';')
        .skip(1)
        .take(4)
        .collect::<Vec<_>>()
        .join(";")
}


//
// DERIVED QUANTITIES
//

// Horizontal wind speed and meteorological direction (degrees from north,
// direction the wind blows FROM), appended when both components parsed.
fn append_derived(values: &mut Vec<(String, f64)>) {
    let u = values.iter().find(|(k, _)| k == "U").map(|(_, v)| *v);
    let v = values.iter().find(|(k, _)| k == "V").map(|(_, v)| *v);

    if let (Some(u), Some(v)) = (u, v) {
        let speed = (u * u + v * v).sqrt();
        let direction = ((-u).atan2(-v).to_degrees() + 360.0) % 360.0;
        values.push(("vel".to_string(), speed));
        values.push(("dir".to_string(), direction));
    }
}
