// src/backend/models/init.rs
use candid::{CandidType, Principal};
use serde::Deserialize;

#[derive(CandidType, Deserialize, Debug, Clone)]
pub struct InitArgs {
    /// Contract owner, also admitted as the first airline.
    pub owner: Principal,
    pub first_airline_name: String,
    /// ICP ledger used for deposits and payouts. Mainnet ledger if absent.
    pub ledger_canister_id: Option<Principal>,
    pub min_cycles_threshold: Option<u128>,
}
