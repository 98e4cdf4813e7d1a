use crate::error::PublishError;
use async_trait::async_trait;
use std::collections::BTreeMap;

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// One message handed to the broker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub exchange: String,
    pub routing_key: String,
    pub queue: String,
    pub content_type: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Envelope {
    pub fn effective_content_type(&self) -> &str {
        if self.content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            &self.content_type
        }
    }
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, envelope: &Envelope) -> Result<(), PublishError>;
}
