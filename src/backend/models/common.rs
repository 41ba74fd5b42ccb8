// src/backend/models/common.rs
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};

// Every participant (owner, airline, passenger, oracle) is a Principal
pub type PrincipalId = Principal;
pub type AirlineId = Principal;
pub type PassengerId = Principal;
pub type OracleId = Principal;

pub type Timestamp = u64; // Epoch seconds, as supplied by the airline
pub type E8s = u64; // Amount in 10^-8 ICP
pub type OracleIndex = u8;

pub const E8S_PER_ICP: E8s = 100_000_000;

/// Admission state of an airline. Only ever advances.
#[derive(
    CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Copy,
)]
pub enum AirlineState {
    Applied,    // Proposed by a funded airline, waiting for votes
    Registered, // Admitted, may not act until funded
    Funded,     // Contributed the minimum funds, full write privileges
}

impl AirlineState {
    /// Registered and Funded airlines both count towards consensus.
    pub fn is_admitted(&self) -> bool {
        matches!(self, AirlineState::Registered | AirlineState::Funded)
    }
}

/// Real-world outcome of a flight as reported by oracles.
#[derive(
    CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Copy, Hash,
)]
pub enum StatusCode {
    #[default]
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl StatusCode {
    /// Numeric code used on the oracle client wire.
    pub fn code(&self) -> u8 {
        match self {
            StatusCode::Unknown => 0,
            StatusCode::OnTime => 10,
            StatusCode::LateAirline => 20,
            StatusCode::LateWeather => 30,
            StatusCode::LateTechnical => 40,
            StatusCode::LateOther => 50,
        }
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = crate::error::FlightSuretyError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(StatusCode::Unknown),
            10 => Ok(StatusCode::OnTime),
            20 => Ok(StatusCode::LateAirline),
            30 => Ok(StatusCode::LateWeather),
            40 => Ok(StatusCode::LateTechnical),
            50 => Ok(StatusCode::LateOther),
            other => Err(crate::error::FlightSuretyError::InvalidInput(format!(
                "Unknown status code {}",
                other
            ))),
        }
    }
}

/// Identifies one flight occurrence.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlightKey {
    pub airline: AirlineId,
    pub code: String,
    pub timestamp: Timestamp,
}

impl FlightKey {
    pub fn new(airline: AirlineId, code: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            airline,
            code: code.into(),
            timestamp,
        }
    }
}

impl std::fmt::Display for FlightKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}/{}", self.code, self.timestamp, self.airline)
    }
}
