//! Shared state for the API router.

use crate::analyze::Analyzer;
use crate::store::JobStore;
use std::sync::Arc;

/// State handed to every handler.
#[derive(Clone)]
pub struct ApiContext {
    pub analyzer: Analyzer,
}

impl ApiContext {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        self.analyzer.store()
    }
}
