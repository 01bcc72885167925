//! Prometheus metrics for the consensus bridge.
//!
//! The [`BridgeMetrics`] struct owns a dedicated [`Registry`] that a
//! metrics endpoint can encode into the Prometheus text exposition
//! format.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Opts, Registry,
};

/// Central collection of bridge-level Prometheus metrics.
pub struct BridgeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Envelopes forwarded to the consensus engine.
    pub envelopes_submitted: IntCounter,
    /// Config-update envelopes forwarded to the consensus engine.
    pub config_envelopes_submitted: IntCounter,
    /// Regular blocks received from the engine.
    pub blocks_received: IntCounter,
    /// Config blocks received from the engine.
    pub config_blocks_received: IntCounter,
    /// Blocks handed to the ledger.
    pub blocks_appended: IntCounter,
    /// Frames on the receive stream that failed to decode.
    pub recv_decode_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Chains currently running.
    pub active_chains: IntGauge,
}

impl BridgeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let envelopes_submitted = register_int_counter_with_registry!(
            Opts::new(
                "pontoon_envelopes_submitted_total",
                "Envelopes forwarded to the consensus engine"
            ),
            registry
        )
        .expect("failed to register envelopes_submitted counter");

        let config_envelopes_submitted = register_int_counter_with_registry!(
            Opts::new(
                "pontoon_config_envelopes_submitted_total",
                "Config-update envelopes forwarded to the consensus engine"
            ),
            registry
        )
        .expect("failed to register config_envelopes_submitted counter");

        let blocks_received = register_int_counter_with_registry!(
            Opts::new(
                "pontoon_blocks_received_total",
                "Regular blocks received from the consensus engine"
            ),
            registry
        )
        .expect("failed to register blocks_received counter");

        let config_blocks_received = register_int_counter_with_registry!(
            Opts::new(
                "pontoon_config_blocks_received_total",
                "Config blocks received from the consensus engine"
            ),
            registry
        )
        .expect("failed to register config_blocks_received counter");

        let blocks_appended = register_int_counter_with_registry!(
            Opts::new(
                "pontoon_blocks_appended_total",
                "Blocks handed to the ledger"
            ),
            registry
        )
        .expect("failed to register blocks_appended counter");

        let recv_decode_failures = register_int_counter_with_registry!(
            Opts::new(
                "pontoon_recv_decode_failures_total",
                "Receive-stream frames that failed to decode"
            ),
            registry
        )
        .expect("failed to register recv_decode_failures counter");

        let active_chains = register_int_gauge_with_registry!(
            Opts::new("pontoon_active_chains", "Chains currently running"),
            registry
        )
        .expect("failed to register active_chains gauge");

        Self {
            registry,
            envelopes_submitted,
            config_envelopes_submitted,
            blocks_received,
            config_blocks_received,
            blocks_appended,
            recv_decode_failures,
            active_chains,
        }
    }
}

impl Default for BridgeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let metrics = BridgeMetrics::new();
        assert_eq!(metrics.envelopes_submitted.get(), 0);
        metrics.envelopes_submitted.inc();
        assert_eq!(metrics.envelopes_submitted.get(), 1);
    }

    #[test]
    fn registry_gathers_all_metrics() {
        let metrics = BridgeMetrics::new();
        metrics.blocks_received.inc();
        let families = metrics.registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "pontoon_blocks_received_total"));
    }
}
