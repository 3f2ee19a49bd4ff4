// SPDX-License-Identifier: BUSL-1.1
//! Shared router state.

use std::sync::Arc;

use brewline_bottling::{Bottling, Pipeline, PipelineMetrics, Shutdown};

/// State handed to every handler. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub bottling: Arc<Bottling>,
}

impl AppState {
    pub fn new(bottling: Arc<Bottling>) -> Self {
        Self { bottling }
    }

    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        Self::new(Arc::clone(pipeline.bottling()))
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.bottling.context().metrics
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.bottling.context().shutdown
    }
}
