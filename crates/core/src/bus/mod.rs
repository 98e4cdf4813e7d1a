//! Outbound catalog messages and the local publisher implementations.

use crate::config::BusSection;
use async_trait::async_trait;
use cloudscope_api::{CatalogEntity, CatalogResult, Envelope, PublishError, Publisher};
use std::sync::{Arc, Mutex};
use tracing::info;

pub type DynPublisher = Arc<dyn Publisher>;

pub const CATALOG_CONTENT_TYPE: &str = "application/json";

/// Builds the envelope carrying a full entity list.
pub fn catalog_envelope(bus: &BusSection, entities: &[CatalogEntity]) -> CatalogResult<Envelope> {
    Ok(Envelope {
        exchange: bus.exchange.clone(),
        routing_key: bus.routing_key.clone(),
        queue: bus.queue.clone(),
        content_type: CATALOG_CONTENT_TYPE.to_string(),
        headers: Default::default(),
        body: serde_json::to_vec(entities)?,
    })
}

/// Writes each envelope to the log instead of a broker.
#[derive(Debug, Default)]
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&self, envelope: &Envelope) -> Result<(), PublishError> {
        info!(
            exchange = %envelope.exchange,
            routing_key = %envelope.routing_key,
            queue = %envelope.queue,
            content_type = envelope.effective_content_type(),
            bytes = envelope.body.len(),
            "envelope published"
        );
        Ok(())
    }
}

/// Captures envelopes in process.
#[derive(Debug, Default)]
pub struct MemoryBus {
    sent: Mutex<Vec<Envelope>>,
}

impl MemoryBus {
    pub fn sent(&self) -> Vec<Envelope> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Publisher for MemoryBus {
    async fn publish(&self, envelope: &Envelope) -> Result<(), PublishError> {
        let mut guard = self
            .sent
            .lock()
            .map_err(|_| PublishError::Rejected("memory bus poisoned".to_string()))?;
        guard.push(envelope.clone());
        Ok(())
    }
}
