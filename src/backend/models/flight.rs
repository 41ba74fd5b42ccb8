// src/backend/models/flight.rs
use crate::models::common::{FlightKey, StatusCode};
use candid::CandidType;
use serde::{Deserialize, Serialize};

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Flight {
    pub key: FlightKey,
    pub registered: bool,
    pub status_code: StatusCode, // Unknown until oracles reach quorum
}
