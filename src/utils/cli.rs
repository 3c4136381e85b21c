// @file: sensor_gateway/src/utils/cli.rs
// @description: Command-line surface; flags override file and environment configuration.
// @author: LAS.

use clap::Parser;

// Flags stay optional here so a value may also arrive via config file or
// GATEWAY_* environment; AppConfig::validate enforces the required ones.
#[derive(Parser, Debug, Default)]
#[command(name = "sensor_gateway", about = "Data interface for TCP/IP-attached instruments")]
pub struct CliArgs {
    /// Device IP address or hostname
    #[arg(long = "ip")]
    pub ip: Option<String>,

    /// TCP connection port
    #[arg(long)]
    pub port: Option<u16>,

    /// Username for the device login
    #[arg(long)]
    pub username: Option<String>,

    /// Password for the device login
    #[arg(long)]
    pub password: Option<String>,

    /// Sensor label stamped on every published measurement
    #[arg(long)]
    pub sensor: Option<String>,

    /// Watchdog window in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}
