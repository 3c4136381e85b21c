use clap::Parser;
use log::{error, info};
use sensor_gateway::api::ws_server;
use sensor_gateway::connectors::{self, DeviceKind};
use sensor_gateway::core::engine::Engine;
use sensor_gateway::core::interfaces::LogProcessor;
use sensor_gateway::utils::cli::CliArgs;
use sensor_gateway::utils::config::AppConfig;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // 1. Initialize Logger with a default level of "info"
    // This ensures you see the logs even without setting RUST_LOG environment variable
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!(">>> Sensor Gateway is Starting... <<<");

    // 2. Load Config (defaults -> file -> env -> CLI)
    let args = CliArgs::parse();
    let mut config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    config.apply_cli(&args);
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // 3. Setup Engine
    let engine = Engine::new(&config);
    engine.register_processor(Box::new(LogProcessor::new())).await;

    // 4. Run Components
    let server_engine = engine.clone();
    let server_config = config.clone();
    tokio::spawn(async move {
        ws_server::start_server(server_engine, server_config).await;
    });

    info!(
        ">>> Engine running. Connecting to {}:{}... <<<",
        config.device_host, config.device_port
    );

    let session = connectors::spawn_connector(DeviceKind::MetekSonic, engine, config);

    tokio::select! {
        result = session => {
            match result {
                Ok(Ok(())) => info!("Device session finished."),
                Ok(Err(e)) => {
                    error!("{}", e);
                    info!("Application terminated.");
                    std::process::exit(1);
                }
                Err(e) => {
                    error!("Device session panicked: {}", e);
                    info!("Application terminated.");
                    std::process::exit(1);
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted by user, shutting down.");
        }
    }

    info!("Application terminated.");
}
