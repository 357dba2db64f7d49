//! Core infrastructure shared by all pipeline stages.

use std::sync::Arc;

use crate::gateway::ReasoningService;

/// Gateway access shared by the pipeline stages.
///
/// Stages hold the reasoning service behind an `Arc<dyn ReasoningService>`
/// so tests can substitute a scripted implementation and the orchestrator
/// can clone the handle into concurrent tasks.
#[derive(Clone)]
pub struct StageCore {
    gateway: Arc<dyn ReasoningService>,
}

impl StageCore {
    /// Create a new stage core over the given reasoning service
    pub fn new(gateway: Arc<dyn ReasoningService>) -> Self {
        Self { gateway }
    }

    /// Get a reference to the reasoning service
    #[inline]
    pub fn gateway(&self) -> &Arc<dyn ReasoningService> {
        &self.gateway
    }
}
