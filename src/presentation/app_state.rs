// Application state for HTTP handlers
use crate::application::aggregation_service::AggregationService;
use crate::application::live_cache::LiveIngestCache;
use std::sync::Arc;
use std::time::Duration;

pub struct AppState {
    pub aggregation_service: AggregationService,
    pub live_cache: Arc<LiveIngestCache>,
    pub aggregation_timeout: Duration,
}
