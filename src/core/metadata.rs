// @file: sensor_gateway/src/core/metadata.rs
// @description: Wire-key to publish-name mapping plus the units/description registry.
// @author: LAS.

use crate::core::models::MeasurementMeta;


//
// PUBLISH NAME MAPPING
//

// Wire keys the telegram parser emits (including derived quantities),
// mapped to the dotted names downstream collectors see.
pub const PUBLISH_NAMES: &[(&str, &str)] = &[
    ("U", "sonic.wind.u"),
    ("V", "sonic.wind.v"),
    ("W", "sonic.wind.w"),
    ("TS", "sonic.temperature"),
    ("vel", "sonic.wind.speed"),
    ("dir", "sonic.wind.direction"),
];


//
// METADATA TABLES
//

pub const UNITS: &[(&str, &str)] = &[
    ("sonic.wind.u", "m/s"),
    ("sonic.wind.v", "m/s"),
    ("sonic.wind.w", "m/s"),
    ("sonic.temperature", "°C"),
    ("sonic.wind.speed", "m/s"),
    ("sonic.wind.direction", "degrees"),
];

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("sonic.wind.u", "Wind vector U-component"),
    ("sonic.wind.v", "Wind vector V-component"),
    ("sonic.wind.w", "Wind vector W-component"),
    ("sonic.temperature", "Acoustic temperature"),
    ("sonic.wind.speed", "Horizontal wind speed"),
    ("sonic.wind.direction", "Horizontal wind direction"),
];


//
// LOOKUP HELPERS
//

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

pub fn publish_name(wire_key: &str) -> Option<&'static str> {
    lookup(PUBLISH_NAMES, wire_key)
}

pub fn units(name: &str) -> Option<&'static str> {
    lookup(UNITS, name)
}

pub fn description(name: &str) -> Option<&'static str> {
    lookup(DESCRIPTIONS, name)
}

/// Full metadata for a publish name. Returns None when either the units or
/// the description entry is missing, in which case the measurement must not
/// be published.
pub fn meta_for(name: &str, sensor: &str) -> Option<MeasurementMeta> {
    Some(MeasurementMeta {
        units: units(name)?.to_string(),
        description: description(name)?.to_string(),
        sensor: sensor.to_string(),
    })
}
