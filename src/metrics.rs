//! Prometheus metrics for the relayer
//!
//! Exposed on the /metrics endpoint for scraping.

#![allow(dead_code)]

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Gauge, GaugeVec};

lazy_static! {
    // Event intake metrics
    pub static ref EVENTS_RECEIVED: CounterVec = register_counter_vec!(
        "relayer_events_received_total",
        "Total number of bridge events received",
        &["chain", "event"]
    ).unwrap();

    pub static ref CLAIMS_SIGNED: CounterVec = register_counter_vec!(
        "relayer_claims_signed_total",
        "Total number of claims constructed and signed",
        &["chain", "claim_type"]
    ).unwrap();

    pub static ref CLAIMS_STORED: CounterVec = register_counter_vec!(
        "relayer_claims_stored_total",
        "Total number of claims persisted to the claim store",
        &["chain"]
    ).unwrap();

    // Connection metrics
    pub static ref RECONNECTS: CounterVec = register_counter_vec!(
        "relayer_reconnects_total",
        "Total number of reconnect attempts",
        &["chain"]
    ).unwrap();

    pub static ref CONNECTED: GaugeVec = register_gauge_vec!(
        "relayer_connected",
        "Whether the chain subscription is currently live",
        &["chain"]
    ).unwrap();

    // Error metrics
    pub static ref ERRORS: CounterVec = register_counter_vec!(
        "relayer_errors_total",
        "Total number of errors",
        &["chain", "type"]
    ).unwrap();

    // Health metrics
    pub static ref UP: Gauge = register_gauge!(
        "relayer_up",
        "Whether the relayer is up and running"
    ).unwrap();
}

/// Record a received bridge event
pub fn record_event(chain: &str, event: &str) {
    EVENTS_RECEIVED.with_label_values(&[chain, event]).inc();
}

/// Record a signed claim
pub fn record_claim_signed(chain: &str, claim_type: &str) {
    CLAIMS_SIGNED.with_label_values(&[chain, claim_type]).inc();
}

/// Record a persisted claim
pub fn record_claim_stored(chain: &str) {
    CLAIMS_STORED.with_label_values(&[chain]).inc();
}

/// Record a reconnect attempt
pub fn record_reconnect(chain: &str) {
    RECONNECTS.with_label_values(&[chain]).inc();
}

/// Update the connection gauge
pub fn set_connected(chain: &str, connected: bool) {
    CONNECTED
        .with_label_values(&[chain])
        .set(if connected { 1.0 } else { 0.0 });
}

/// Record an error
pub fn record_error(chain: &str, error_type: &str) {
    ERRORS.with_label_values(&[chain, error_type]).inc();
}
