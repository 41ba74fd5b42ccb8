// src/backend/services/flight_service.rs

use crate::{
    error::FlightSuretyError,
    metrics,
    models::{
        common::{AirlineId, FlightKey, StatusCode, Timestamp},
        event::LedgerEvent,
        flight::Flight,
    },
    services::{access_guard::require_operational, airline_service::require_funded_airline},
    storage::LedgerState,
    utils::log::log_info,
};

/// Registers a flight for the calling airline, which must be funded.
pub fn register_flight(
    state: &mut LedgerState,
    caller: AirlineId,
    code: String,
    timestamp: Timestamp,
) -> Result<FlightKey, FlightSuretyError> {
    require_operational(state)?;
    require_funded_airline(state, caller)?;

    let key = FlightKey::new(caller, code, timestamp);
    if state.flights.contains(&key) {
        return Err(FlightSuretyError::DuplicateFlight);
    }

    let flight = Flight {
        key: key.clone(),
        registered: true,
        status_code: StatusCode::Unknown,
    };
    state.flights.insert(&flight);
    metrics::record(state, |m| m.flights_registered += 1);
    state.emit(LedgerEvent::FlightRegistered { flight: key.clone() });
    log_info!("Flight {} registered", key);
    Ok(key)
}

pub fn is_flight_registered(state: &LedgerState, key: &FlightKey) -> bool {
    state.flights.get(key).is_some_and(|flight| flight.registered)
}

/// Fails with `UnknownFlight` for keys never registered.
pub fn require_registered_flight(state: &LedgerState, key: &FlightKey) -> Result<Flight, FlightSuretyError> {
    state
        .flights
        .get(key)
        .filter(|flight| flight.registered)
        .ok_or(FlightSuretyError::UnknownFlight)
}

pub fn get_flight(state: &LedgerState, key: &FlightKey) -> Option<Flight> {
    state.flights.get(key)
}

pub fn flights_by_airline(state: &LedgerState, airline: &AirlineId) -> Vec<Flight> {
    state.flights.by_airline(airline)
}

/// Records the finalized status on the flight. Only oracle consensus calls this.
pub(crate) fn set_flight_status(
    state: &mut LedgerState,
    key: &FlightKey,
    status: StatusCode,
) -> Result<(), FlightSuretyError> {
    let mut flight = require_registered_flight(state, key)?;
    flight.status_code = status;
    state.flights.insert(&flight);
    Ok(())
}
