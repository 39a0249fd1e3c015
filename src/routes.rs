use crate::{api, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub type ApiLimiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-peer limiter allowing `requests_per_min` requests, refilled evenly
/// across the minute. Built once so every worker shares the same quota.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<ApiLimiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min} per minute"))?;
    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: ApiLimiter) {
    cfg.service(api::index).service(api::health).service(
        web::scope(&config.api_prefix)
            .wrap(limiter) // rate limiting
            .configure(api::configure),
    );
}
