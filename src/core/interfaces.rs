// @file: sensor_gateway\src\core\interfaces.rs
// @description: Defines the processor trait and the rate-sampled LogProcessor.
// @author: LAS.

use crate::core::models::SensorEvent;
use async_trait::async_trait;
use log::{error, info};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

//
// TRAIT DEFINITIONS
//

#[async_trait]
pub trait EventProcessor: Send + Sync {
    // #1. Process an event leaving the engine
    // Using Arc<SensorEvent> to match the engine's zero-copy architecture
    async fn process(&self, event: Arc<SensorEvent>);

    // #2. Handle errors
    #[allow(dead_code)]
    fn on_error(&self, error: String);
}


//
// LOG PROCESSOR
//

// Telegrams arrive at tens of Hz; logging every event would drown the journal,
// so output is sampled to one line per event class per 10 seconds.
pub struct LogProcessor {
    pub event_counter: AtomicU64,
    pub last_sample_log: AtomicU64,
    pub last_measurement_log: AtomicU64,
}

impl LogProcessor {
    pub fn new() -> Self {
        LogProcessor {
            event_counter: AtomicU64::new(0),
            last_sample_log: AtomicU64::new(0),
            last_measurement_log: AtomicU64::new(0),
        }
    }

    fn check_and_log(&self, last_log: &AtomicU64, now: u64, event: &Arc<SensorEvent>, label: &str) {
        let last = last_log.load(Ordering::Relaxed);
        // 10,000 ms = 10 seconds
        if now > last + 10_000 {
            // Attempt to update the timestamp. If successful, we are the
            // designated logger for this interval, even with concurrent callers.
            if last_log
                .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                info!("10s sample [{}]: {:?}", label, event);
            }
        }
    }
}

#[async_trait]
impl EventProcessor for LogProcessor {
    async fn process(&self, event: Arc<SensorEvent>) {
        self.event_counter.fetch_add(1, Ordering::Relaxed);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        match *event {
            SensorEvent::Sample(_) => {
                self.check_and_log(&self.last_sample_log, now, &event, "Sample")
            }
            SensorEvent::Measurement(_) => {
                self.check_and_log(&self.last_measurement_log, now, &event, "Measurement")
            }
            // Status events are rare and always worth a line
            SensorEvent::Status(ref s) => info!("Status event: {} = {}", s.name, s.value),
        }
    }

    fn on_error(&self, error: String) {
        error!("Processor error: {}", error);
    }
}
