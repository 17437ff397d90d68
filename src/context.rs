//! Request-scoped page context
//!
//! Everything a page render needs travels in one explicit context object:
//! configuration, the backend client, the HTTP client for WMS queries, and
//! the ROI in effect for this pass. There is no cross-request shared state;
//! a new interaction builds a new context.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::roi::Roi;

#[derive(Clone)]
pub struct PageContext {
    pub config: Arc<Config>,
    pub backend: Arc<dyn BackendClient>,
    pub http: reqwest::Client,
    pub roi: Roi,
}

impl PageContext {
    pub fn new(config: Arc<Config>, backend: Arc<dyn BackendClient>) -> Self {
        Self {
            config,
            backend,
            http: reqwest::Client::new(),
            roi: Roi::default(),
        }
    }

    /// Same context with a different ROI in effect.
    pub fn with_roi(mut self, roi: Roi) -> Self {
        self.roi = roi;
        self
    }

    /// Default map view from configuration.
    pub fn default_view(&self) -> ((f64, f64), u8) {
        (
            (self.config.map.center_lat, self.config.map.center_lon),
            self.config.map.zoom,
        )
    }
}
