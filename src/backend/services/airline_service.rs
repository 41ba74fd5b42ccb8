// src/backend/services/airline_service.rs
// Airline admission: Applied -> Registered -> Funded.

use crate::{
    adapter::ledger_adapter::FundsTransfer,
    error::FlightSuretyError,
    metrics,
    models::{
        airline::Airline,
        common::{AirlineId, AirlineState, E8s, PrincipalId, E8S_PER_ICP},
        event::LedgerEvent,
    },
    services::access_guard::require_operational,
    storage::LedgerState,
    utils::log::log_info,
};

pub const MINIMUM_FUNDS: E8s = 10 * E8S_PER_ICP;
/// The first airlines are admitted by any funded airline without a vote.
pub const DIRECT_REGISTRATION_LIMIT: u64 = 4;
/// Admission needs votes * DENOMINATOR >= admitted airlines.
pub const CONSENSUS_DENOMINATOR: u64 = 2;

/// Fails with `NotFunded` unless `caller` is a funded airline.
pub fn require_funded_airline(state: &LedgerState, caller: AirlineId) -> Result<(), FlightSuretyError> {
    match state.airlines.get(&caller) {
        Some(airline) if airline.is_funded() => Ok(()),
        _ => Err(FlightSuretyError::NotFunded),
    }
}

/// Registers `airline` on behalf of the funded airline `caller`.
///
/// While fewer than `DIRECT_REGISTRATION_LIMIT` airlines are admitted the
/// target is admitted immediately. Afterwards the call counts as the
/// caller's vote and the target is admitted once half of the admitted
/// airlines (counted before this admission) have voted for it.
///
/// # Returns
/// * `Ok(AirlineState::Applied)` - the vote was recorded, more are needed.
/// * `Ok(AirlineState::Registered)` - the airline is now admitted.
pub fn register_airline(
    state: &mut LedgerState,
    caller: PrincipalId,
    name: String,
    airline_id: AirlineId,
) -> Result<AirlineState, FlightSuretyError> {
    require_operational(state)?;
    require_funded_airline(state, caller)?;

    let existing = state.airlines.get(&airline_id);
    if existing.as_ref().is_some_and(|a| a.state.is_admitted()) {
        return Err(FlightSuretyError::AlreadyRegistered);
    }

    let admitted = state.airlines.admitted_count();
    let mut airline = existing.unwrap_or_else(|| Airline::applied(airline_id, name));

    if admitted < DIRECT_REGISTRATION_LIMIT {
        airline.state = AirlineState::Registered;
        admit(state, &airline)?;
        log_info!(
            "Airline {} ({}) registered directly by {}",
            airline.name,
            airline_id,
            caller
        );
        return Ok(AirlineState::Registered);
    }

    if !airline.voters.insert(caller) {
        return Err(FlightSuretyError::DuplicateVote);
    }
    let votes = airline.voters.len() as u64;

    if has_consensus(votes, admitted) {
        airline.state = AirlineState::Registered;
        admit(state, &airline)?;
        log_info!(
            "Airline {} ({}) registered by consensus: {} of {} votes",
            airline.name,
            airline_id,
            votes,
            admitted
        );
    } else {
        state.airlines.insert(&airline);
        state.emit(LedgerEvent::AirlineApplied {
            airline: airline_id,
            voter: caller,
            votes: votes as u32,
        });
        log_info!(
            "Vote from {} recorded for airline {}: {} of {} admitted airlines",
            caller,
            airline_id,
            votes,
            admitted
        );
    }
    Ok(airline.state)
}

/// Strict-majority check; a pure function of the vote count.
pub fn has_consensus(votes: u64, admitted: u64) -> bool {
    votes.saturating_mul(CONSENSUS_DENOMINATOR) >= admitted
}

fn admit(state: &mut LedgerState, airline: &Airline) -> Result<(), FlightSuretyError> {
    state.airlines.increment_admitted()?;
    state.airlines.insert(airline);
    metrics::record(state, |m| m.airlines_admitted += 1);
    state.emit(LedgerEvent::AirlineRegistered {
        airline: airline.airline_id,
        name: airline.name.clone(),
    });
    Ok(())
}

/// Checks that `caller` may fund with `amount` without touching state.
pub fn validate_funding(
    state: &LedgerState,
    caller: AirlineId,
    amount: E8s,
) -> Result<Airline, FlightSuretyError> {
    require_operational(state)?;
    if amount < MINIMUM_FUNDS {
        return Err(FlightSuretyError::InsufficientFunds);
    }
    state
        .airlines
        .get(&caller)
        .filter(|airline| airline.state.is_admitted())
        .ok_or(FlightSuretyError::AirlineNotRegistered)
}

/// Contributes `amount` from the calling airline. Registered airlines become
/// Funded; further contributions from a Funded airline accumulate.
pub fn fund(
    state: &mut LedgerState,
    caller: AirlineId,
    amount: E8s,
    transfer: &mut impl FundsTransfer,
) -> Result<Airline, FlightSuretyError> {
    let mut airline = validate_funding(state, caller, amount)?;
    let funds_e8s = airline
        .funds_e8s
        .checked_add(amount)
        .ok_or_else(|| FlightSuretyError::InvalidInput("Funding amount overflows".to_string()))?;

    transfer.collect(caller, amount)?;

    let newly_funded = !airline.is_funded();
    airline.funds_e8s = funds_e8s;
    airline.state = AirlineState::Funded;
    state.airlines.insert(&airline);
    metrics::record(state, |m| {
        m.airline_funds_e8s = m.airline_funds_e8s.saturating_add(amount);
        if newly_funded {
            m.airlines_funded += 1;
        }
    });
    state.emit(LedgerEvent::AirlineFunded {
        airline: caller,
        amount_e8s: amount,
    });
    log_info!(
        "Airline {} funded with {} e8s (total {} e8s)",
        caller,
        amount,
        airline.funds_e8s
    );
    Ok(airline)
}

/// Registered or Funded.
pub fn is_registered(state: &LedgerState, airline_id: &AirlineId) -> bool {
    state
        .airlines
        .get(airline_id)
        .is_some_and(|a| a.state.is_admitted())
}

pub fn is_funded(state: &LedgerState, airline_id: &AirlineId) -> bool {
    state.airlines.get(airline_id).is_some_and(|a| a.is_funded())
}

/// Number of admitted (Registered or Funded) airlines.
pub fn airlines_count(state: &LedgerState) -> u64 {
    state.airlines.admitted_count()
}

pub fn get_airline(state: &LedgerState, airline_id: &AirlineId) -> Option<Airline> {
    state.airlines.get(airline_id)
}

pub fn list_airlines(state: &LedgerState) -> Vec<Airline> {
    state.airlines.list()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::access_guard::set_operational;
    use crate::services::test_support::{admit_and_fund, fund_owner, new_ledger, principal, MockTransfer, OWNER};

    #[test]
    fn owner_is_first_airline_but_cannot_act_unfunded() {
        let mut state = new_ledger();
        assert!(is_registered(&state, &principal(OWNER)));
        assert!(!is_funded(&state, &principal(OWNER)));
        assert_eq!(airlines_count(&state), 1);

        let result = register_airline(&mut state, principal(OWNER), "Second".into(), principal(2));
        assert_eq!(result, Err(FlightSuretyError::NotFunded));
        assert!(get_airline(&state, &principal(2)).is_none());
    }

    #[test]
    fn first_four_airlines_register_without_votes() {
        let mut state = new_ledger();
        fund_owner(&mut state);

        for id in 2..=4 {
            let result = register_airline(&mut state, principal(OWNER), format!("Air {}", id), principal(id));
            assert_eq!(result, Ok(AirlineState::Registered));
            assert!(get_airline(&state, &principal(id)).unwrap().voters.is_empty());
        }
        assert_eq!(airlines_count(&state), 4);

        let result = register_airline(&mut state, principal(OWNER), "Air 2".into(), principal(2));
        assert_eq!(result, Err(FlightSuretyError::AlreadyRegistered));
    }

    #[test]
    fn unfunded_airline_cannot_register_others() {
        let mut state = new_ledger();
        fund_owner(&mut state);
        register_airline(&mut state, principal(OWNER), "Second".into(), principal(2)).unwrap();

        let result = register_airline(&mut state, principal(2), "Third".into(), principal(3));
        assert_eq!(result, Err(FlightSuretyError::NotFunded));
        assert!(!is_registered(&state, &principal(3)));
    }

    #[test]
    fn fifth_airline_needs_half_of_admitted_airlines() {
        let mut state = new_ledger();
        fund_owner(&mut state);
        admit_and_fund(&mut state, &[2, 3, 4]);
        assert_eq!(airlines_count(&state), 4);

        let result = register_airline(&mut state, principal(OWNER), "Fifth".into(), principal(5));
        assert_eq!(result, Ok(AirlineState::Applied));
        assert!(!is_registered(&state, &principal(5)));
        assert_eq!(airlines_count(&state), 4);

        let result = register_airline(&mut state, principal(OWNER), "Fifth".into(), principal(5));
        assert_eq!(result, Err(FlightSuretyError::DuplicateVote));

        let result = register_airline(&mut state, principal(2), "Fifth".into(), principal(5));
        assert_eq!(result, Ok(AirlineState::Registered));
        assert!(is_registered(&state, &principal(5)));
        assert_eq!(airlines_count(&state), 5);

        let result = register_airline(&mut state, principal(3), "Fifth".into(), principal(5));
        assert_eq!(result, Err(FlightSuretyError::AlreadyRegistered));
    }

    #[test]
    fn sixth_airline_needs_three_votes_of_five() {
        let mut state = new_ledger();
        fund_owner(&mut state);
        admit_and_fund(&mut state, &[2, 3, 4]);
        register_airline(&mut state, principal(OWNER), "Fifth".into(), principal(5)).unwrap();
        register_airline(&mut state, principal(2), "Fifth".into(), principal(5)).unwrap();
        assert_eq!(airlines_count(&state), 5);

        assert_eq!(
            register_airline(&mut state, principal(3), "Sixth".into(), principal(6)),
            Ok(AirlineState::Applied)
        );
        assert_eq!(
            register_airline(&mut state, principal(4), "Sixth".into(), principal(6)),
            Ok(AirlineState::Applied)
        );
        // Fifth airline is Registered but not Funded, so its vote is refused.
        assert_eq!(
            register_airline(&mut state, principal(5), "Sixth".into(), principal(6)),
            Err(FlightSuretyError::NotFunded)
        );
        assert_eq!(
            register_airline(&mut state, principal(OWNER), "Sixth".into(), principal(6)),
            Ok(AirlineState::Registered)
        );
        assert_eq!(get_airline(&state, &principal(6)).unwrap().voters.len(), 3);
    }

    #[test]
    fn consensus_is_a_function_of_vote_count_only() {
        assert!(!has_consensus(1, 4));
        assert!(has_consensus(2, 4));
        assert!(!has_consensus(2, 5));
        assert!(has_consensus(3, 5));
    }

    #[test]
    fn funding_rules() {
        let mut state = new_ledger();
        let mut transfer = MockTransfer::default();

        assert_eq!(
            fund(&mut state, principal(OWNER), MINIMUM_FUNDS - 1, &mut transfer),
            Err(FlightSuretyError::InsufficientFunds)
        );
        assert_eq!(
            fund(&mut state, principal(9), MINIMUM_FUNDS, &mut transfer),
            Err(FlightSuretyError::AirlineNotRegistered)
        );
        assert!(transfer.collected.is_empty());

        let airline = fund(&mut state, principal(OWNER), MINIMUM_FUNDS, &mut transfer).unwrap();
        assert_eq!(airline.state, AirlineState::Funded);

        let airline = fund(&mut state, principal(OWNER), MINIMUM_FUNDS, &mut transfer).unwrap();
        assert_eq!(airline.funds_e8s, 2 * MINIMUM_FUNDS);
        assert_eq!(transfer.collected.len(), 2);
        assert_eq!(state.metrics.get().airlines_funded, 1);
    }

    #[test]
    fn failed_collection_leaves_airline_unfunded() {
        let mut state = new_ledger();
        let result = fund(&mut state, principal(OWNER), MINIMUM_FUNDS, &mut MockTransfer::failing());
        assert!(matches!(result, Err(FlightSuretyError::TransferFailed(_))));
        assert!(!is_funded(&state, &principal(OWNER)));
        assert_eq!(get_airline(&state, &principal(OWNER)).unwrap().funds_e8s, 0);
    }

    #[test]
    fn paused_ledger_rejects_registration_and_funding_but_serves_reads() {
        let mut state = new_ledger();
        fund_owner(&mut state);
        set_operational(&mut state, principal(OWNER), false).unwrap();

        assert_eq!(
            register_airline(&mut state, principal(OWNER), "Second".into(), principal(2)),
            Err(FlightSuretyError::NotOperational)
        );
        assert_eq!(
            fund(&mut state, principal(OWNER), MINIMUM_FUNDS, &mut MockTransfer::default()),
            Err(FlightSuretyError::NotOperational)
        );
        assert!(is_funded(&state, &principal(OWNER)));
        assert_eq!(airlines_count(&state), 1);
    }
}
