// src/backend/services/oracle_service.rs
// Oracle registration, status requests and response quorum.

use crate::{
    adapter::ledger_adapter::FundsTransfer,
    error::FlightSuretyError,
    metrics,
    models::{
        common::{E8s, FlightKey, OracleId, OracleIndex, PrincipalId, StatusCode, E8S_PER_ICP},
        event::LedgerEvent,
        oracle::{OracleRegistration, RequestState, ResponseOutcome, StatusRequest, INDEXES_PER_ORACLE},
    },
    services::{
        access_guard::require_operational,
        flight_service::{require_registered_flight, set_flight_status},
        insurance_service::credit_insurees,
    },
    storage::LedgerState,
    utils::log::log_info,
};
use rand::{seq::index::sample, Rng, RngCore};

/// Indexes are drawn from 0..INDEX_SPACE.
pub const INDEX_SPACE: OracleIndex = 10;
pub const ORACLE_REGISTRATION_FEE: E8s = E8S_PER_ICP;
/// Matching responses needed to finalize a request.
pub const MIN_RESPONSES: usize = 3;

/// Picks `INDEXES_PER_ORACLE` distinct indexes uniformly from the index space.
pub fn assign_indexes<R: RngCore + ?Sized>(rng: &mut R) -> [OracleIndex; INDEXES_PER_ORACLE] {
    let picked = sample(rng, INDEX_SPACE as usize, INDEXES_PER_ORACLE);
    let mut indexes = [0; INDEXES_PER_ORACLE];
    for (slot, index) in indexes.iter_mut().zip(picked.iter()) {
        *slot = index as OracleIndex;
    }
    indexes
}

/// Checks an oracle registration without touching state.
pub fn validate_oracle_registration(
    state: &LedgerState,
    oracle: OracleId,
    fee: E8s,
) -> Result<(), FlightSuretyError> {
    require_operational(state)?;
    if fee < ORACLE_REGISTRATION_FEE {
        return Err(FlightSuretyError::InsufficientFunds);
    }
    if state.oracles.is_registered(&oracle) {
        return Err(FlightSuretyError::AlreadyRegistered);
    }
    if !state.is_seeded() {
        return Err(FlightSuretyError::RandomnessUnavailable);
    }
    Ok(())
}

/// Registers the calling oracle and returns its assigned indexes.
pub fn register_oracle(
    state: &mut LedgerState,
    oracle: OracleId,
    fee: E8s,
    transfer: &mut impl FundsTransfer,
) -> Result<[OracleIndex; INDEXES_PER_ORACLE], FlightSuretyError> {
    validate_oracle_registration(state, oracle, fee)?;
    transfer.collect(oracle, fee)?;

    let indexes = assign_indexes(state.rng()?);
    let registration = OracleRegistration {
        oracle,
        indexes,
        fee_paid_e8s: fee,
    };
    state.oracles.insert_registration(&registration);
    metrics::record(state, |m| {
        m.oracles_registered += 1;
        m.oracle_fees_e8s = m.oracle_fees_e8s.saturating_add(fee);
    });
    state.emit(LedgerEvent::OracleRegistered {
        oracle,
        indexes: indexes.to_vec(),
    });
    log_info!("Oracle {} registered with indexes {:?}", oracle, indexes);
    Ok(indexes)
}

/// Indexes assigned to `oracle`, if registered.
pub fn get_oracle_indexes(state: &LedgerState, oracle: &OracleId) -> Option<[OracleIndex; INDEXES_PER_ORACLE]> {
    state
        .oracles
        .get_registration(oracle)
        .map(|registration| registration.indexes)
}

/// Asks oracles for the status of `flight` and returns the index they must
/// answer against. A flight has a single request: while it is open the
/// request is announced again; once finalized its index is returned as is.
pub fn fetch_flight_status(
    state: &mut LedgerState,
    caller: PrincipalId,
    flight: FlightKey,
) -> Result<OracleIndex, FlightSuretyError> {
    require_operational(state)?;
    require_registered_flight(state, &flight)?;

    if let Some(request) = state.oracles.get_request(&flight) {
        if request.is_open() {
            state.emit(LedgerEvent::OracleRequest {
                index: request.index,
                flight,
            });
        }
        return Ok(request.index);
    }

    let index = state.rng()?.gen_range(0..INDEX_SPACE);
    let request = StatusRequest::open(flight.clone(), index, caller);
    state.oracles.insert_request(&request);
    metrics::record(state, |m| m.requests_opened += 1);
    state.emit(LedgerEvent::OracleRequest {
        index,
        flight: flight.clone(),
    });
    log_info!("Status of flight {} requested by {} at index {}", flight, caller, index);
    Ok(index)
}

/// Records one oracle's report. The first status to collect
/// `MIN_RESPONSES` distinct oracles finalizes the request; a `LateAirline`
/// outcome credits the flight's insurees. Reports after finalization are
/// recorded and change nothing else.
pub fn submit_oracle_response(
    state: &mut LedgerState,
    oracle: OracleId,
    flight: FlightKey,
    index: OracleIndex,
    status: StatusCode,
) -> Result<ResponseOutcome, FlightSuretyError> {
    require_operational(state)?;
    let assigned = state
        .oracles
        .get_registration(&oracle)
        .is_some_and(|registration| registration.has_index(index));
    if !assigned {
        return Err(FlightSuretyError::InvalidIndex);
    }
    let mut request = state
        .oracles
        .get_request(&flight)
        .filter(|request| request.index == index)
        .ok_or(FlightSuretyError::NoMatchingRequest)?;

    request.responses.entry(status).or_default().insert(oracle);
    let matching = request.response_count(status);

    let outcome = match request.state {
        RequestState::Finalized(finalized) => ResponseOutcome::AlreadyFinalized { status: finalized },
        RequestState::Open if matching >= MIN_RESPONSES => {
            let credited = if status == StatusCode::LateAirline {
                let logic_caller = state.config.logic_caller();
                credit_insurees(state, logic_caller, &flight)?.len() as u32
            } else {
                0
            };
            set_flight_status(state, &flight, status)?;
            request.state = RequestState::Finalized(status);
            ResponseOutcome::Finalized { status, credited }
        }
        RequestState::Open => ResponseOutcome::Recorded {
            status,
            matching: matching as u32,
        },
    };

    state.oracles.insert_request(&request);
    state.emit(LedgerEvent::OracleReport {
        oracle,
        flight: flight.clone(),
        status,
    });
    if let ResponseOutcome::Finalized { status, credited } = outcome {
        metrics::record(state, |m| m.requests_finalized += 1);
        state.emit(LedgerEvent::FlightStatusInfo {
            flight: flight.clone(),
            status,
        });
        log_info!(
            "Flight {} (requested by {}) finalized as {:?} by {} matching reports, {} insurees credited",
            flight,
            request.requester,
            status,
            matching,
            credited
        );
    }
    Ok(outcome)
}

pub fn get_status_request(state: &LedgerState, flight: &FlightKey) -> Option<StatusRequest> {
    state.oracles.get_request(flight)
}

pub fn open_requests(state: &LedgerState) -> Vec<StatusRequest> {
    state.oracles.open_requests()
}
