// src/backend/error.rs
use candid::CandidType;
use serde::Deserialize;
use thiserror::Error;

#[derive(CandidType, Deserialize, Error, Debug, Clone, PartialEq, Eq)]
pub enum FlightSuretyError {
    #[error("Ledger is not operational")]
    NotOperational,

    #[error("Caller is not authorized for this operation")]
    Unauthorized,

    #[error("Airline has not provided the minimum funding")]
    NotFunded,

    #[error("Amount is below the required minimum")]
    InsufficientFunds,

    #[error("Participant is already registered")]
    AlreadyRegistered,

    #[error("Airline has already voted for this candidate")]
    DuplicateVote,

    #[error("Flight is already registered")]
    DuplicateFlight,

    #[error("Flight is not registered")]
    UnknownFlight,

    #[error("Insurance amount is outside the allowed range")]
    AmountOutOfRange,

    #[error("Passenger is already insured for this flight")]
    DuplicatePolicy,

    #[error("Passenger has no credit to withdraw")]
    NoCreditBalance,

    #[error("Index is not assigned to this oracle")]
    InvalidIndex,

    #[error("No open status request matches this response")]
    NoMatchingRequest,

    #[error("Identity is not an admitted airline")]
    AirlineNotRegistered,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Funds transfer failed: {0}")]
    TransferFailed(String),

    #[error("Random generator has not been seeded yet")]
    RandomnessUnavailable,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Canister cycle balance too low for operation")]
    CycleLow,
}
