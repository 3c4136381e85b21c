// @file: sensor_gateway/src/tests/fanout_verifier.rs
// @description: End-to-end fan-out checks: snapshot on subscribe, channel filtering, status delivery.
// @author: LAS.

#[cfg(test)]
mod fanout_verification_tests {
    use crate::api::ws_server;
    use crate::core::engine::Engine;
    use crate::core::models::{Sample, SensorEvent};
    use crate::utils::config::AppConfig;
    use futures_util::stream::SplitStream;
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::{sleep, timeout, Duration};
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

    type WsRead = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

    fn test_config() -> AppConfig {
        AppConfig {
            log_level: "error".to_string(),
            device_host: "127.0.0.1".to_string(),
            device_port: 7200,
            device_username: "data".to_string(),
            device_password: "METEKGMBH".to_string(),
            sensor: "test_rig".to_string(),
            timeout_secs: 300,
            reconnect_delay_max: 60,
            history_limit: 10,
            broadcast_buffer_size: 100,
            server_bind_address: "127.0.0.1:0".to_string(),
        }
    }

    fn sample(sensor: &str, timestamp_ns: u64) -> Sample {
        Sample {
            sensor: sensor.to_string(),
            timestamp_ns,
            values: vec![("TS".to_string(), 20.0)],
        }
    }

    async fn next_event(read: &mut WsRead) -> SensorEvent {
        loop {
            let msg = timeout(Duration::from_secs(2), read.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("stream ended")
                .expect("websocket error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).expect("frame should be a SensorEvent");
            }
        }
    }

    //
    // TEST: SNAPSHOT, LIVE FILTERING AND STATUS DELIVERY
    //

    #[tokio::test]
    async fn test_subscribe_snapshot_then_filtered_live_feed() {
        let engine = Engine::new(&test_config());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server_engine = engine.clone();
        tokio::spawn(async move {
            ws_server::run_listener(listener, server_engine).await;
        });

        // #1. History exists before the collector shows up
        engine.publish_sample(sample("test_rig", 1)).await;

        let (ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        let (mut write, mut read) = ws.split();

        write
            .send(Message::Text(
                r#"{"action":"subscribe","channel":"test_rig"}"#.to_string(),
            ))
            .await
            .unwrap();

        // #2. Snapshot: the pre-existing sample comes back first
        match next_event(&mut read).await {
            SensorEvent::Sample(s) => {
                assert_eq!(s.sensor, "test_rig");
                assert_eq!(s.timestamp_ns, 1);
            }
            other => panic!("Expected snapshot sample, got {:?}", other),
        }

        // #3. Live feed: events published after the snapshot arrive in order
        engine.publish_sample(sample("test_rig", 2)).await;

        let mut saw_live_sample = false;
        for _ in 0..8 {
            match next_event(&mut read).await {
                SensorEvent::Sample(s) if s.timestamp_ns == 2 => {
                    saw_live_sample = true;
                    break;
                }
                SensorEvent::Measurement(m) => assert_eq!(m.meta.sensor, "test_rig"),
                other => panic!("Unexpected frame: {:?}", other),
            }
        }
        assert!(saw_live_sample, "Live sample never arrived.");

        // #4. Another sensor's data is filtered out, but its status is not
        engine.publish_sample(sample("other_rig", 3)).await;
        engine
            .publish_status("other_rig", "exit.status", "Unknown_Timeout")
            .await;

        match next_event(&mut read).await {
            SensorEvent::Status(s) => {
                assert_eq!(s.sensor, "other_rig");
                assert_eq!(s.value, "Unknown_Timeout");
            }
            other => panic!(
                "Expected only the status to cross the filter, got {:?}",
                other
            ),
        }

        // #5. After unsubscribe only status events are delivered
        write
            .send(Message::Text(
                r#"{"action":"unsubscribe","channel":"test_rig"}"#.to_string(),
            ))
            .await
            .unwrap();

        // Let the server drain the command before publishing again
        sleep(Duration::from_millis(100)).await;

        engine.publish_sample(sample("test_rig", 4)).await;
        engine
            .publish_status("test_rig", "link.status", "Connected")
            .await;

        match next_event(&mut read).await {
            SensorEvent::Status(s) => assert_eq!(s.value, "Connected"),
            other => panic!("Unsubscribed channel leaked a frame: {:?}", other),
        }
    }
}
