//! Builders wiring domain services to the in-memory store.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use backend::domain::ports::FixtureLoginService;
use backend::inbound::http::state::{ApiEndpoints, HttpState};
use backend::outbound::persistence::InMemoryStore;

/// Session state backed by the fixture accounts.
pub(super) fn build_http_state() -> web::Data<HttpState> {
    web::Data::new(HttpState::new(Arc::new(FixtureLoginService)))
}

/// Every endpoint, sharing one store for the lifetime of the process.
pub(super) fn build_api_endpoints() -> ApiEndpoints {
    let store = Arc::new(InMemoryStore::new());
    info!("serving records from the in-memory store");
    ApiEndpoints::from_store(store, Arc::new(DefaultClock))
}
