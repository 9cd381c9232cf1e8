//! Application state shared across all request handlers.

use std::sync::Arc;

use loyalty_core::auth::AuthConfig;
use loyalty_core::service::Service;

/// Cloneable handler state: the service facade plus the auth material the
/// cookie extractor needs.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(service: Arc<Service>, auth: AuthConfig) -> Self {
        Self { service, auth }
    }
}
