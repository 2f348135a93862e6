//! Deployment spans.
//!
//! Every deployment runs inside one `deploy` span. It carries a random
//! `run_id` from the start and the transaction hash once the node assigns
//! one, so events emitted while polling correlate to the transaction.

use tracing::field::Empty;
use tracing::Span;
use uuid::Uuid;

/// Create the span for one deployment run.
pub fn deploy_span() -> Span {
    tracing::info_span!("deploy", run_id = %Uuid::new_v4(), tx_hash = Empty)
}

/// Attach the node-assigned hash to the current deployment span.
pub fn record_tx_hash(span: &Span, tx_hash: &str) {
    span.record("tx_hash", tx_hash);
}
