use crate::models::common::{AirlineId, E8s, FlightKey, OracleId, OracleIndex, PassengerId, StatusCode};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// Ledger events, appended in execution order. The oracle client follows
/// `OracleRequest` entries to learn which index to answer.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    AirlineApplied { airline: AirlineId, voter: AirlineId, votes: u32 },
    AirlineRegistered { airline: AirlineId, name: String },
    AirlineFunded { airline: AirlineId, amount_e8s: E8s },
    FlightRegistered { flight: FlightKey },
    PolicyIssued { passenger: PassengerId, flight: FlightKey, premium_e8s: E8s },
    OracleRegistered { oracle: OracleId, indexes: Vec<OracleIndex> },
    OracleRequest { index: OracleIndex, flight: FlightKey },
    OracleReport { oracle: OracleId, flight: FlightKey, status: StatusCode },
    FlightStatusInfo { flight: FlightKey, status: StatusCode },
    InsureeCredited { passenger: PassengerId, flight: FlightKey, amount_e8s: E8s },
    CreditsWithdrawn { passenger: PassengerId, amount_e8s: E8s },
    CreditRestored { passenger: PassengerId, amount_e8s: E8s },
    OperationalChanged { operational: bool },
}

/// An event with its position in the log.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: LedgerEvent,
}
