// @file: sensor_gateway/src/connectors/metek.rs
// @description: TCP session for METEK-class sonic anemometers with handshake, watchdog and reconnect.
// @author: LAS.

pub mod telegram;

use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration, Instant};

use crate::core::engine::Engine;
use crate::utils::config::AppConfig;


//
// ERROR TYPE
//

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("device rejected credentials")]
    AuthRejected,
    #[error("connection closed by device")]
    ClosedByPeer,
    #[error("no valid telegram within the watchdog window")]
    WatchdogExpired,
}


//
// SESSION LOGIC
//

// The session only returns on fatal conditions. Transport errors reconnect
// with capped exponential backoff; the watchdog spans reconnect attempts, so
// a device that flaps without ever delivering data still trips it.
pub async fn run_session(engine: Engine, config: AppConfig) -> Result<(), DeviceError> {
    let watchdog = Duration::from_secs(config.timeout_secs);
    let mut backoff_seconds: u64 = 1;
    let mut last_valid = Instant::now();

    loop {
        match connect(&config).await {
            Ok(reader) => {
                backoff_seconds = 1;
                info!(
                    "Authenticated to {}:{} as {}",
                    config.device_host, config.device_port, config.device_username
                );

                match read_loop(reader, &engine, &config, &mut last_valid, watchdog).await {
                    Err(DeviceError::WatchdogExpired) => {
                        return fail_watchdog(&engine, &config).await;
                    }
                    Err(e) => warn!("Device stream ended: {}", e),
                    Ok(()) => {}
                }
            }
            Err(DeviceError::AuthRejected) => {
                // Retrying bad credentials is noise; let the process die loud.
                error!("Connection failed: authentication rejected. Check device or network.");
                return Err(DeviceError::AuthRejected);
            }
            Err(e) => {
                warn!("Connection failed: {}. Check device or network.", e);
            }
        }

        if last_valid.elapsed() >= watchdog {
            return fail_watchdog(&engine, &config).await;
        }

        sleep(Duration::from_secs(backoff_seconds)).await;
        backoff_seconds = std::cmp::min(backoff_seconds * 2, config.reconnect_delay_max.max(1));
    }
}


//
// CONNECT & HANDSHAKE
//

async fn connect(config: &AppConfig) -> Result<BufReader<TcpStream>, DeviceError> {
    let addr = format!("{}:{}", config.device_host, config.device_port);
    let mut stream = TcpStream::connect(&addr).await?;

    // Send username and password for authentication
    stream
        .write_all(format!("{}\r\n", config.device_username).as_bytes())
        .await?;
    stream
        .write_all(format!("{}\r\n", config.device_password).as_bytes())
        .await?;

    // Handle the failed authentication
    let mut reader = BufReader::new(stream);
    let mut response = String::new();
    let n = reader.read_line(&mut response).await?;
    if n == 0 {
        return Err(DeviceError::ClosedByPeer);
    }
    if !response.contains("Authentication successful") {
        return Err(DeviceError::AuthRejected);
    }

    Ok(reader)
}


//
// READ LOOP
//

async fn read_loop(
    mut reader: BufReader<TcpStream>,
    engine: &Engine,
    config: &AppConfig,
    last_valid: &mut Instant,
    watchdog: Duration,
) -> Result<(), DeviceError> {
    let mut line = String::new();

    loop {
        let remaining = match watchdog.checked_sub(last_valid.elapsed()) {
            Some(d) => d,
            None => return Err(DeviceError::WatchdogExpired),
        };

        line.clear();
        let n = match timeout(remaining, reader.read_line(&mut line)).await {
            Err(_) => return Err(DeviceError::WatchdogExpired),
            Ok(result) => result?,
        };
        if n == 0 {
            return Err(DeviceError::ClosedByPeer);
        }

        match telegram::parse(&line, &config.sensor) {
            Some(sample) => {
                *last_valid = Instant::now();
                engine.publish_sample(sample).await;
            }
            None => debug!("Discarded telegram without known tokens: {}", line.trim_end()),
        }
    }
}


//
// WATCHDOG EXIT
//

async fn fail_watchdog(engine: &Engine, config: &AppConfig) -> Result<(), DeviceError> {
    error!(
        "No valid telegram for {}s, giving up.",
        config.timeout_secs
    );
    engine
        .publish_status(&config.sensor, "exit.status", "Unknown_Timeout")
        .await;
    Err(DeviceError::WatchdogExpired)
}
