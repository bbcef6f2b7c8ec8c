//! Metrics collection and exposition.
//!
//! # Metrics
//! - `yam_polls_total` (counter): poll passes by result
//! - `yam_poll_duration_seconds` (histogram): time of one pass
//! - `yam_offers_listed` (gauge): offers published by the last pass
//! - `yam_offers_skipped_total` (counter): offers dropped after a fetch error
//! - `yam_offer_submissions_total` (counter): sell submissions by outcome
//! - `yam_rpc_health` (gauge): 1=reachable, 0=unreachable, per chain

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_poll(listed: usize, skipped: usize, elapsed: Duration) {
    metrics::counter!("yam_polls_total", "result" => "ok").increment(1);
    metrics::histogram!("yam_poll_duration_seconds").record(elapsed.as_secs_f64());
    metrics::gauge!("yam_offers_listed").set(listed as f64);
    metrics::counter!("yam_offers_skipped_total").increment(skipped as u64);
}

pub fn record_poll_failure() {
    metrics::counter!("yam_polls_total", "result" => "error").increment(1);
}

pub fn record_submission(outcome: &'static str) {
    metrics::counter!("yam_offer_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_rpc_health(chain_id: u64, healthy: bool) {
    metrics::gauge!("yam_rpc_health", "chain_id" => chain_id.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
