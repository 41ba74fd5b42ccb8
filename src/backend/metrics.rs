// src/backend/metrics.rs
use crate::models::common::E8s;
use crate::storage::LedgerState;
use crate::utils::log::log_warn;
use candid::CandidType;
use serde::{Deserialize, Serialize};

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerMetrics {
    pub airlines_admitted: u64,
    pub airlines_funded: u64,
    pub airline_funds_e8s: E8s,
    pub flights_registered: u64,
    pub policies_issued: u64,
    pub premiums_e8s: E8s,
    pub oracles_registered: u64,
    pub oracle_fees_e8s: E8s,
    pub requests_opened: u64,
    pub requests_finalized: u64,
    pub credits_issued_e8s: E8s,
    pub credits_withdrawn_e8s: E8s,
}

/// Applies a metrics update. Metrics are informational: a failed write is
/// logged, never allowed to fail the operation that produced it.
pub fn record<F>(state: &mut LedgerState, update_fn: F)
where
    F: FnOnce(&mut LedgerMetrics),
{
    if let Err(e) = state.metrics.update(update_fn) {
        log_warn!("Failed to update ledger metrics: {}", e);
    }
}
