// @file: sensor_gateway/src/connectors/mod.rs
// @description: Factory module for spawning device session tasks based on DeviceKind.
// @author: LAS.

pub mod metek;

use crate::connectors::metek::DeviceError;
use crate::core::engine::Engine;
use crate::utils::config::AppConfig;
use std::fmt;
use tokio::task;

//
// DEVICE KINDS
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    MetekSonic,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

//
// FACTORY FUNCTION
//

// Returns the session handle so the caller can turn a fatal session error
// (auth rejection, watchdog expiry) into the process exit code.
pub fn spawn_connector(
    kind: DeviceKind,
    engine: Engine,
    config: AppConfig,
) -> task::JoinHandle<Result<(), DeviceError>> {
    match kind {
        DeviceKind::MetekSonic => task::spawn(async move {
            metek::run_session(engine, config).await
        }),
    }
}
