//! Per-request context injected by middleware.

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub received_at: Instant,
}

impl RequestContext {
    pub fn elapsed_ms(&self) -> u128 {
        self.received_at.elapsed().as_millis()
    }
}
