/// Prometheus metrics for the ORYN governance core.
///
/// The embedding node exposes these at GET /metrics, compatible with
/// Prometheus scrape. All metrics use the "oryn_" prefix.
use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

pub struct Metrics {
    // Epoch lifecycle
    pub proposals:       IntCounter,
    pub votes:           IntCounter,
    pub votes_rejected:  IntCounter,
    pub epoch_changes:   IntCounter,
    pub active_epoch_id: IntGauge,
    pub group_size:      IntGauge,

    // Access control
    pub registry_updates: IntCounter,
    pub gate_denied:      IntCounter,

    // Persistence
    pub snapshots_saved:  IntCounter,
    pub snapshots_loaded: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let r = registry();
        macro_rules! int_counter {
            ($name:expr, $help:expr) => {{
                let c = IntCounter::with_opts(Opts::new($name, $help))?;
                r.register(Box::new(c.clone()))?;
                c
            }};
        }
        macro_rules! int_gauge {
            ($name:expr, $help:expr) => {{
                let g = IntGauge::with_opts(Opts::new($name, $help))?;
                r.register(Box::new(g.clone()))?;
                g
            }};
        }

        Ok(Self {
            proposals:       int_counter!("oryn_epoch_proposals_total", "Epoch proposals accepted"),
            votes:           int_counter!("oryn_epoch_votes_total", "Epoch votes recorded"),
            votes_rejected:  int_counter!("oryn_epoch_votes_rejected_total", "Epoch votes rejected (unauthorized/stale/duplicate)"),
            epoch_changes:   int_counter!("oryn_epoch_changes_total", "Epochs promoted to active"),
            active_epoch_id: int_gauge!("oryn_active_epoch_id", "Id of the active epoch"),
            group_size:      int_gauge!("oryn_group_size", "Peer count of the active epoch"),

            registry_updates: int_counter!("oryn_registry_updates_total", "Access-control registry mutations applied"),
            gate_denied:      int_counter!("oryn_gate_denied_total", "Transactions denied by the gas admission gate"),

            snapshots_saved:  int_counter!("oryn_snapshots_saved_total", "Governance snapshots saved to disk"),
            snapshots_loaded: int_counter!("oryn_snapshots_loaded_total", "Governance snapshots loaded from disk"),
        })
    }
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Global metric handles, registered on first use. Names are unique within
/// this module, so registration cannot collide.
pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(|| Metrics::new().expect("governance metric registration"))
}

/// Render all registered metrics as Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut out = Vec::new();
    encoder.encode(&metric_families, &mut out).unwrap_or_default();
    String::from_utf8(out).unwrap_or_default()
}
