use std::sync::Arc;

use config::Config;
use gateway::RequestGateway;
use providers::ModelProviders;
use usage::UsageLedger;

pub mod analysis;
pub mod cache;
pub mod common;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod providers;
pub mod usage;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<dyn UsageLedger>,
    pub providers: Arc<dyn ModelProviders>,
}

impl AppState {
    pub fn gateway(&self) -> RequestGateway {
        RequestGateway::new(
            self.ledger.clone(),
            self.providers.clone(),
            self.config.gemini_api_key.clone(),
            self.config.free_request_limit,
        )
    }
}
