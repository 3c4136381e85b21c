// @file: sensor_gateway/src/utils/config.rs
// @description: Layered configuration: defaults, optional file, environment, then CLI.
// @author: LAS.

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use crate::utils::cli::CliArgs;

//
// TYPE DEFINITIONS
//

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,

    // Device Session
    pub device_host: String,
    pub device_port: u16,
    pub device_username: String,
    pub device_password: String,
    pub sensor: String,
    pub timeout_secs: u64,
    pub reconnect_delay_max: u64,

    // Engine Limits
    pub history_limit: usize,
    pub broadcast_buffer_size: usize,

    // Server Settings
    pub server_bind_address: String,
}

impl AppConfig {
    //
    // PUBLIC INTERFACE
    //

    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("log_level", "info")?
            .set_default("device_host", "")?
            .set_default("device_port", 7200)?
            .set_default("device_username", "data")?
            .set_default("device_password", "METEKGMBH")?
            .set_default("sensor", "")?
            .set_default("timeout_secs", 300)?
            .set_default("reconnect_delay_max", 60)?
            .set_default("history_limit", 100)?
            .set_default("broadcast_buffer_size", 1000)?
            .set_default("server_bind_address", "127.0.0.1:8080")?
            // File & Env Overrides
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("GATEWAY"));

        let config = builder.build()?;
        config.try_deserialize()
    }

    // CLI flags win over every other source.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(ip) = &args.ip {
            self.device_host = ip.clone();
        }
        if let Some(port) = args.port {
            self.device_port = port;
        }
        if let Some(username) = &args.username {
            self.device_username = username.clone();
        }
        if let Some(password) = &args.password {
            self.device_password = password.clone();
        }
        if let Some(sensor) = &args.sensor {
            self.sensor = sensor.clone();
        }
        if let Some(timeout) = args.timeout {
            self.timeout_secs = timeout;
        }
    }

    // Required values may come from any layer, so absence is only an error
    // after the merge is complete.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_host.is_empty() {
            return Err(ConfigError::Message(
                "device_host is required (--ip)".to_string(),
            ));
        }
        if self.sensor.is_empty() {
            return Err(ConfigError::Message(
                "sensor label is required (--sensor)".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
