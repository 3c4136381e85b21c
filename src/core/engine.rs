// @file: sensor_gateway/src/core/engine.rs
// @description: State registry with bounded history, processor notification and event broadcast.
// @author: LAS.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use log::error;
use tokio::sync::{broadcast, RwLock};
use crate::core::interfaces::EventProcessor;
use crate::core::metadata;
use crate::core::models::{now_ns, Measurement, Sample, SensorEvent, StatusEvent};
use crate::utils::config::AppConfig;


//
// TYPE DEFINITIONS
//

pub type ProcessorList = Arc<RwLock<Vec<Box<dyn EventProcessor>>>>;


//
// GRANULAR SENSOR STATE
//

pub struct SensorState {
    pub latest: RwLock<Option<Sample>>,
    pub history: RwLock<VecDeque<Sample>>,
    pub last_status: RwLock<Option<StatusEvent>>,
}

impl SensorState {
    fn new(history_cap: usize) -> Self {
        Self {
            latest: RwLock::new(None),
            history: RwLock::new(VecDeque::with_capacity(history_cap)),
            last_status: RwLock::new(None),
        }
    }
}


//
// ENGINE STRUCT
//

#[derive(Clone)]
pub struct Engine {
    pub registry: Arc<RwLock<HashMap<String, Arc<SensorState>>>>,
    pub processors: ProcessorList,
    pub tx: broadcast::Sender<(String, Arc<SensorEvent>)>,
    // Config Limits
    pub history_limit: usize,
}


impl Engine {
    //
    // INITIALIZATION
    //

    pub fn new(config: &AppConfig) -> Self {
        let (tx, _rx) = broadcast::channel(config.broadcast_buffer_size);

        Engine {
            registry: Arc::new(RwLock::new(HashMap::new())),
            processors: Arc::new(RwLock::new(Vec::new())),
            tx,
            history_limit: config.history_limit,
        }
    }

    pub async fn register_processor(&self, processor: Box<dyn EventProcessor>) {
        let mut processors_guard = self.processors.write().await;
        processors_guard.push(processor);
    }


    //
    // INTERNAL HELPER
    //

    async fn get_or_create_sensor(&self, sensor: &str) -> Arc<SensorState> {
        {
            let reg = self.registry.read().await;
            if let Some(state) = reg.get(sensor) {
                return state.clone();
            }
        }

        let mut reg = self.registry.write().await;
        let cap = self.history_limit;

        reg.entry(sensor.to_string())
            .or_insert_with(|| Arc::new(SensorState::new(cap)))
            .clone()
    }


    //
    // PUBLISHING
    //

    pub async fn publish_sample(&self, sample: Sample) {
        let state = self.get_or_create_sensor(&sample.sensor).await;
        {
            let mut history_guard = state.history.write().await;
            if history_guard.len() >= self.history_limit {
                history_guard.pop_front();
            }
            history_guard.push_back(sample.clone());
        }
        {
            let mut latest_guard = state.latest.write().await;
            *latest_guard = Some(sample.clone());
        }

        // Expand into named measurements. Keys without a publish name were
        // never meant to leave the gateway; keys with a publish name but no
        // metadata entry are an operator error and must not be published.
        for (key, value) in &sample.values {
            let name = match metadata::publish_name(key) {
                Some(n) => n,
                None => continue,
            };
            match metadata::meta_for(name, &sample.sensor) {
                Some(meta) => {
                    self.broadcast_event(SensorEvent::Measurement(Measurement {
                        name: name.to_string(),
                        value: *value,
                        timestamp_ns: sample.timestamp_ns,
                        meta,
                    }))
                    .await;
                }
                None => error!("Metadata entry missing for {}", name),
            }
        }

        self.broadcast_event(SensorEvent::Sample(sample)).await;
    }

    pub async fn publish_status(&self, sensor: &str, name: &str, value: &str) {
        let status = StatusEvent {
            sensor: sensor.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            timestamp_ns: now_ns(),
        };

        let state = self.get_or_create_sensor(sensor).await;
        {
            let mut status_guard = state.last_status.write().await;
            *status_guard = Some(status.clone());
        }

        self.broadcast_event(SensorEvent::Status(status)).await;
    }


    //
    // BROADCAST HELPERS
    //

    async fn broadcast_event(&self, event: SensorEvent) {
        if let Ok(json) = serde_json::to_string(&event) {
            let msg = Arc::new(event);
            self.notify_processors(msg.clone()).await;
            let _ = self.tx.send((json, msg));
        }
    }

    async fn notify_processors(&self, event: Arc<SensorEvent>) {
        let processors = self.processors.read().await;
        for processor in processors.iter() {
            processor.process(event.clone()).await;
        }
    }


    //
    // DATA ACCESSORS
    //

    pub async fn latest_sample(&self, sensor: &str) -> Option<Sample> {
        let state = {
            let reg = self.registry.read().await;
            reg.get(sensor).cloned()
        };
        if let Some(s) = state {
            return s.latest.read().await.clone();
        }
        None
    }

    pub async fn recent_samples(&self, sensor: &str) -> Vec<Sample> {
        let state = {
            let reg = self.registry.read().await;
            reg.get(sensor).cloned()
        };
        if let Some(s) = state {
            return s.history.read().await.iter().cloned().collect();
        }
        Vec::new()
    }

    pub async fn last_status(&self, sensor: &str) -> Option<StatusEvent> {
        let state = {
            let reg = self.registry.read().await;
            reg.get(sensor).cloned()
        };
        if let Some(s) = state {
            return s.last_status.read().await.clone();
        }
        None
    }
}
