use crate::api::{attendance, site};
use actix_governor::{
    GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::{Context, Result};

/// Fixed: the OpenAPI paths and the bundled page both assume it.
pub const API_PREFIX: &str = "/api";

pub type ApiGovernorConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer limiter for the API scope.
pub fn build_limiter_config(requests_per_min: u32) -> Result<ApiGovernorConfig> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limit configuration")
}

// Routes outside the API prefix
pub fn public_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(site::index).service(site::health);
}

// Mounted under the API prefix
pub fn attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/clock-in").route(web::post().to(attendance::clock_in)))
        .service(web::resource("/clock-out").route(web::post().to(attendance::clock_out)))
        .service(web::resource("/attendance").route(web::get().to(attendance::list_attendance)));
}
