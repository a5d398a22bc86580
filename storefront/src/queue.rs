use crate::storage::StorageError;
use async_trait::async_trait;
use pgmq::PGMQueue;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Fire-and-forget message queue. Out of scope for correctness: a failed
/// send surfaces as an error to the caller but never rolls back the write
/// that preceded it.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn send(&self, payload: &Value) -> Result<(), StorageError>;
}

/// Fire-and-forget event bus, published to on product creation.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(
        &self,
        source: &str,
        detail_type: &str,
        payload: &Value,
    ) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Serialize)]
struct EventEnvelope<'a> {
    source: &'a str,
    detail_type: &'a str,
    detail: &'a Value,
}

/// Postgres-backed queue (pgmq) on the same database the stores use.
pub struct PgmqMessageQueue {
    queue: PGMQueue,
    queue_name: String,
}

impl PgmqMessageQueue {
    pub async fn new(database_url: &str, queue_name: &str) -> Result<Self, StorageError> {
        let queue = PGMQueue::new(database_url.to_string()).await?;
        info!("Creating queue '{}'", queue_name);
        queue.create(queue_name).await?;
        Ok(Self {
            queue,
            queue_name: queue_name.to_string(),
        })
    }
}

#[async_trait]
impl MessageQueue for PgmqMessageQueue {
    async fn send(&self, payload: &Value) -> Result<(), StorageError> {
        self.queue.send(&self.queue_name, payload).await?;
        Ok(())
    }
}

/// Event bus on top of pgmq: envelopes carrying source and detail-type go
/// to a dedicated event queue.
pub struct PgmqEventBus {
    queue: PGMQueue,
    queue_name: String,
}

impl PgmqEventBus {
    pub async fn new(database_url: &str, queue_name: &str) -> Result<Self, StorageError> {
        let queue = PGMQueue::new(database_url.to_string()).await?;
        info!("Creating event queue '{}'", queue_name);
        queue.create(queue_name).await?;
        Ok(Self {
            queue,
            queue_name: queue_name.to_string(),
        })
    }
}

#[async_trait]
impl EventBus for PgmqEventBus {
    async fn publish(
        &self,
        source: &str,
        detail_type: &str,
        payload: &Value,
    ) -> Result<(), StorageError> {
        let envelope = EventEnvelope {
            source,
            detail_type,
            detail: payload,
        };
        self.queue
            .send(&self.queue_name, &serde_json::to_value(&envelope)?)
            .await?;
        Ok(())
    }
}

/// In-memory queue for tests and local runs. `failing()` makes every send
/// fail, which is how the create-product failure-policy tests force the
/// 500 path.
#[derive(Default)]
pub struct InMemoryQueue {
    messages: Arc<Mutex<VecDeque<Value>>>,
    should_fail: bool,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            messages: Arc::new(Mutex::new(VecDeque::new())),
            should_fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<Value> {
        let messages = self.messages.lock().await;
        messages.iter().cloned().collect()
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn send(&self, payload: &Value) -> Result<(), StorageError> {
        if self.should_fail {
            return Err("simulated queue failure".into());
        }
        let mut messages = self.messages.lock().await;
        messages.push_back(payload.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub source: String,
    pub detail_type: String,
    pub detail: Value,
}

#[derive(Default)]
pub struct InMemoryEventBus {
    events: Arc<Mutex<Vec<PublishedEvent>>>,
    should_fail: bool,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
        }
    }

    pub async fn published(&self) -> Vec<PublishedEvent> {
        let events = self.events.lock().await;
        events.clone()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(
        &self,
        source: &str,
        detail_type: &str,
        payload: &Value,
    ) -> Result<(), StorageError> {
        if self.should_fail {
            return Err("simulated event bus failure".into());
        }
        let mut events = self.events.lock().await;
        events.push(PublishedEvent {
            source: source.to_string(),
            detail_type: detail_type.to_string(),
            detail: payload.clone(),
        });
        Ok(())
    }
}
