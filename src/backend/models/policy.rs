// src/backend/models/policy.rs
use crate::models::common::{E8s, FlightKey, PassengerId};
use candid::CandidType;
use serde::{Deserialize, Serialize};

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct InsurancePolicy {
    pub passenger: PassengerId,
    pub flight: FlightKey,
    pub premium_e8s: E8s,
    pub settled: bool,
}

/// Insurees and the premiums held against one flight.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlightCoverage {
    pub insurees: Vec<PassengerId>,
    pub liability_e8s: E8s,
    pub paid_out: bool,
}
