// src/backend/models/oracle.rs
use crate::models::common::{E8s, FlightKey, OracleId, OracleIndex, PrincipalId, StatusCode};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const INDEXES_PER_ORACLE: usize = 3;

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OracleRegistration {
    pub oracle: OracleId,
    pub indexes: [OracleIndex; INDEXES_PER_ORACLE],
    pub fee_paid_e8s: E8s,
}

impl OracleRegistration {
    pub fn has_index(&self, index: OracleIndex) -> bool {
        self.indexes.contains(&index)
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum RequestState {
    Open,
    Finalized(StatusCode),
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct StatusRequest {
    pub flight: FlightKey,
    pub index: OracleIndex,
    pub requester: PrincipalId,
    pub responses: BTreeMap<StatusCode, BTreeSet<OracleId>>,
    pub state: RequestState,
}

impl StatusRequest {
    pub fn open(flight: FlightKey, index: OracleIndex, requester: PrincipalId) -> Self {
        Self {
            flight,
            index,
            requester,
            responses: BTreeMap::new(),
            state: RequestState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == RequestState::Open
    }

    pub fn finalized_status(&self) -> Option<StatusCode> {
        match self.state {
            RequestState::Finalized(status) => Some(status),
            RequestState::Open => None,
        }
    }

    /// Number of distinct oracles that reported `status`.
    pub fn response_count(&self, status: StatusCode) -> usize {
        self.responses.get(&status).map_or(0, BTreeSet::len)
    }
}

/// What a single oracle response did to its request.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub enum ResponseOutcome {
    Recorded { status: StatusCode, matching: u32 },
    Finalized { status: StatusCode, credited: u32 },
    AlreadyFinalized { status: StatusCode },
}
