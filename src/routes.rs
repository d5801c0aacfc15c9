use crate::{api::reports, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{Scope, web};

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let dispatch_limiter = build_limiter(config.rate_dispatch_per_min);

    let scope = reports_scope(&config.api_prefix);

    match dispatch_limiter {
        Some(limiter) => cfg.service(scope.wrap(limiter)),
        None => {
            tracing::warn!("Invalid rate limit settings, dispatch routes are not rate limited");
            cfg.service(scope)
        }
    };
}

/// Routes without rate limiting, for in-process tests.
pub fn configure_unlimited(cfg: &mut web::ServiceConfig, api_prefix: &str) {
    cfg.service(reports_scope(api_prefix));
}

fn reports_scope(api_prefix: &str) -> Scope {
    web::scope(&format!("{api_prefix}/reports"))
        // /reports/send-to-all
        .service(web::resource("/send-to-all").route(web::post().to(reports::send_to_all)))
        // /reports/send-to-target
        .service(web::resource("/send-to-target").route(web::post().to(reports::send_to_target)))
}
