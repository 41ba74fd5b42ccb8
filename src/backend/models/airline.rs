// src/backend/models/airline.rs
use crate::models::common::{AirlineId, AirlineState, E8s, PrincipalId};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Airline {
    pub airline_id: AirlineId,
    pub name: String,
    pub state: AirlineState,
    pub voters: BTreeSet<PrincipalId>, // Funded airlines that endorsed admission
    pub funds_e8s: E8s,                // Cumulative contributions
}

impl Airline {
    pub fn applied(airline_id: AirlineId, name: String) -> Self {
        Self {
            airline_id,
            name,
            state: AirlineState::Applied,
            voters: BTreeSet::new(),
            funds_e8s: 0,
        }
    }

    pub fn is_funded(&self) -> bool {
        self.state == AirlineState::Funded
    }
}
