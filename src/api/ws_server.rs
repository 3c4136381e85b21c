// @file: sensor_gateway/src/api/ws_server.rs
// @description: WebSocket fan-out with snapshot-on-subscribe for downstream collectors.
// @author: LAS.

use std::collections::HashSet;
use std::net::SocketAddr;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use crate::core::engine::Engine;
use crate::core::models::{Command, CommandAction, SensorEvent};
use crate::utils::config::AppConfig;


pub async fn start_server(engine: Engine, config: AppConfig) {
    let addr: SocketAddr = config.server_bind_address.parse().expect("Invalid bind address");
    let listener: TcpListener = TcpListener::bind(&addr).await.expect("Failed to bind");

    info!("WebSocket fan-out listening on: {}", addr);

    run_listener(listener, engine).await;
}

pub async fn run_listener(listener: TcpListener, engine: Engine) {
    while let Ok((stream, _)) = listener.accept().await {
        let engine_clone: Engine = engine.clone();
        tokio::spawn(handle_connection(stream, engine_clone));
    }
}


async fn handle_connection(stream: TcpStream, engine: Engine) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("Error during websocket handshake: {}", e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();
    let mut engine_rx = engine.tx.subscribe();
    let mut subscribed_channels: HashSet<String> = HashSet::new();

    info!("Collector connected");

    loop {
        tokio::select! {
            client_msg = read.next() => {
                match client_msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(cmd) = serde_json::from_str::<Command>(&text) {
                            match cmd.action {
                                CommandAction::Subscribe => {
                                    subscribed_channels.insert(cmd.channel.clone());

                                    //
                                    // #1. SNAPSHOT: LAST STATUS
                                    //

                                    if let Some(status) = engine.last_status(&cmd.channel).await {
                                        if let Ok(json) = serde_json::to_string(&SensorEvent::Status(status)) {
                                            let _ = write.send(Message::Text(json)).await;
                                        }
                                    }

                                    //
                                    // #2. SNAPSHOT: RECENT HISTORY (oldest first)
                                    //

                                    let recent = engine.recent_samples(&cmd.channel).await;
                                    for sample in recent {
                                        if let Ok(json) = serde_json::to_string(&SensorEvent::Sample(sample)) {
                                            let _ = write.send(Message::Text(json)).await;
                                        }
                                    }
                                }
                                CommandAction::Unsubscribe => {
                                    subscribed_channels.remove(&cmd.channel);
                                }
                            }
                        }
                    }
                    _ => break,
                }
            }

            engine_msg = engine_rx.recv() => {
                match engine_msg {
                    Ok((json_str, event)) => {
                        // Status events reach every collector; anything else
                        // is filtered by the connection's subscription set.
                        let deliver = matches!(&*event, SensorEvent::Status(_))
                            || subscribed_channels.contains(event.sensor());

                        if deliver && write.send(Message::Text(json_str)).await.is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        }
    }

    info!("Collector disconnected");
}
