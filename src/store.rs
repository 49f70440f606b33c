use crate::types::WebhookEvent;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// An accepted event as recorded by the receiver.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedEvent {
    pub id: String,
    pub delivery_id: String,
    pub received_at: DateTime<Utc>,
    pub event: WebhookEvent,
}

/// Bounded in-memory history of accepted events, oldest dropped first.
pub struct EventStore {
    events: VecDeque<ReceivedEvent>,
    capacity: usize,
    total_received: u64,
}

impl EventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            total_received: 0,
        }
    }

    /// Record every event of one delivery under a shared delivery id.
    pub fn record_delivery(&mut self, events: Vec<WebhookEvent>) -> String {
        let delivery_id = uuid::Uuid::new_v4().to_string();
        let received_at = Utc::now();
        for event in events {
            if self.events.len() >= self.capacity {
                self.events.pop_front();
            }
            self.events.push_back(ReceivedEvent {
                id: uuid::Uuid::new_v4().to_string(),
                delivery_id: delivery_id.clone(),
                received_at,
                event,
            });
            self.total_received += 1;
        }
        delivery_id
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> Vec<&ReceivedEvent> {
        self.events.iter().rev().take(limit).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_received(&self) -> u64 {
        self.total_received
    }
}
