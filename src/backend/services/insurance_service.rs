// src/backend/services/insurance_service.rs
// Policy issuance, passenger credits and pull-style withdrawal.

use crate::{
    adapter::ledger_adapter::FundsTransfer,
    error::FlightSuretyError,
    metrics,
    models::{
        common::{E8s, FlightKey, PassengerId, PrincipalId, E8S_PER_ICP},
        event::LedgerEvent,
        policy::InsurancePolicy,
    },
    services::{
        access_guard::{require_authorized_caller, require_operational},
        flight_service::require_registered_flight,
    },
    storage::LedgerState,
    utils::log::{log_info, log_warn},
};

/// Maximum premium per policy.
pub const INSURANCE_PRICE_LIMIT: E8s = E8S_PER_ICP;
/// Payout is premium * NUMERATOR / DENOMINATOR, rounded down.
pub const PAYOUT_NUMERATOR: u128 = 3;
pub const PAYOUT_DENOMINATOR: u128 = 2;

/// Credit owed for a premium when the airline is at fault. Saturates.
pub fn payout_for(premium: E8s) -> E8s {
    let credit = premium as u128 * PAYOUT_NUMERATOR / PAYOUT_DENOMINATOR;
    E8s::try_from(credit).unwrap_or(E8s::MAX)
}

/// Checks an insurance purchase without touching state.
pub fn validate_insurance(
    state: &LedgerState,
    passenger: PassengerId,
    flight: &FlightKey,
    amount: E8s,
) -> Result<(), FlightSuretyError> {
    require_operational(state)?;
    require_registered_flight(state, flight)?;
    if amount == 0 || amount > INSURANCE_PRICE_LIMIT {
        return Err(FlightSuretyError::AmountOutOfRange);
    }
    if state.policies.get_policy(&passenger, flight).is_some() {
        return Err(FlightSuretyError::DuplicatePolicy);
    }
    Ok(())
}

/// Sells `passenger` a policy on `flight` for `amount`.
pub fn insure_flight(
    state: &mut LedgerState,
    passenger: PassengerId,
    flight: FlightKey,
    amount: E8s,
    transfer: &mut impl FundsTransfer,
) -> Result<InsurancePolicy, FlightSuretyError> {
    validate_insurance(state, passenger, &flight, amount)?;
    let mut coverage = state.policies.coverage(&flight);
    let liability_e8s = coverage
        .liability_e8s
        .checked_add(amount)
        .ok_or_else(|| FlightSuretyError::InvalidInput("Flight liability overflows".to_string()))?;

    transfer.collect(passenger, amount)?;

    let policy = InsurancePolicy {
        passenger,
        flight: flight.clone(),
        premium_e8s: amount,
        settled: false,
    };
    state.policies.insert_policy(&policy);
    coverage.insurees.push(passenger);
    coverage.liability_e8s = liability_e8s;
    state.policies.set_coverage(&flight, coverage);

    metrics::record(state, |m| {
        m.policies_issued += 1;
        m.premiums_e8s = m.premiums_e8s.saturating_add(amount);
    });
    state.emit(LedgerEvent::PolicyIssued {
        passenger,
        flight: flight.clone(),
        premium_e8s: amount,
    });
    log_info!("Passenger {} insured flight {} for {} e8s", passenger, flight, amount);
    Ok(policy)
}

pub fn is_passenger_insured(state: &LedgerState, flight: &FlightKey, passenger: &PassengerId) -> bool {
    state.policies.get_policy(passenger, flight).is_some()
}

pub fn get_policy(state: &LedgerState, flight: &FlightKey, passenger: &PassengerId) -> Option<InsurancePolicy> {
    state.policies.get_policy(passenger, flight)
}

/// Zero for passengers never credited.
pub fn get_passenger_credit_balance(state: &LedgerState, passenger: &PassengerId) -> E8s {
    state.policies.credit_balance(passenger)
}

/// Credits every unsettled policy on `flight` with its payout and settles it.
/// Runs at most once per flight. Internal entry point: `caller` must be an
/// authorized caller, which in practice is the ledger's logic identity used
/// by oracle consensus.
pub(crate) fn credit_insurees(
    state: &mut LedgerState,
    caller: PrincipalId,
    flight: &FlightKey,
) -> Result<Vec<(PassengerId, E8s)>, FlightSuretyError> {
    require_operational(state)?;
    require_authorized_caller(state, caller)?;

    let mut coverage = state.policies.coverage(flight);
    if coverage.paid_out {
        log_warn!("Payout for flight {} already issued, ignoring", flight);
        return Ok(Vec::new());
    }

    // Compute every credit before writing any.
    let mut credits = Vec::new();
    let mut settled = Vec::new();
    for passenger in &coverage.insurees {
        let Some(mut policy) = state.policies.get_policy(passenger, flight) else {
            continue;
        };
        if policy.settled {
            continue;
        }
        let amount = payout_for(policy.premium_e8s);
        let balance = state
            .policies
            .credit_balance(passenger)
            .checked_add(amount)
            .ok_or_else(|| FlightSuretyError::InvalidInput("Credit balance overflows".to_string()))?;
        policy.settled = true;
        credits.push((*passenger, amount, balance));
        settled.push(policy);
    }

    for policy in &settled {
        state.policies.insert_policy(policy);
    }
    for (passenger, amount, balance) in &credits {
        state.policies.set_credit_balance(passenger, *balance);
        state.emit(LedgerEvent::InsureeCredited {
            passenger: *passenger,
            flight: flight.clone(),
            amount_e8s: *amount,
        });
        log_info!("Passenger {} credited {} e8s for flight {}", passenger, amount, flight);
    }
    coverage.paid_out = true;
    state.policies.set_coverage(flight, coverage);

    let total: E8s = credits.iter().fold(0, |acc, (_, amount, _)| acc.saturating_add(*amount));
    metrics::record(state, |m| m.credits_issued_e8s = m.credits_issued_e8s.saturating_add(total));

    Ok(credits
        .into_iter()
        .map(|(passenger, amount, _)| (passenger, amount))
        .collect())
}

/// Pays out the caller's whole credit balance. The balance is zeroed before
/// the transfer collaborator runs; if the transfer fails it is put back.
pub fn withdraw_credits(
    state: &mut LedgerState,
    passenger: PassengerId,
    transfer: &mut impl FundsTransfer,
) -> Result<E8s, FlightSuretyError> {
    require_operational(state)?;
    let balance = state.policies.credit_balance(&passenger);
    if balance == 0 {
        return Err(FlightSuretyError::NoCreditBalance);
    }

    state.policies.set_credit_balance(&passenger, 0);
    if let Err(e) = transfer.disburse(passenger, balance) {
        state.policies.set_credit_balance(&passenger, balance);
        log_warn!("Withdrawal of {} e8s for {} failed: {}", balance, passenger, e);
        return Err(e);
    }

    metrics::record(state, |m| {
        m.credits_withdrawn_e8s = m.credits_withdrawn_e8s.saturating_add(balance)
    });
    state.emit(LedgerEvent::CreditsWithdrawn {
        passenger,
        amount_e8s: balance,
    });
    log_info!("Passenger {} withdrew {} e8s", passenger, balance);
    Ok(balance)
}

/// Puts back a withdrawn amount whose transfer could not be completed
/// after the withdrawal was committed. Authorized callers only.
pub fn restore_credit(
    state: &mut LedgerState,
    caller: PrincipalId,
    passenger: PassengerId,
    amount: E8s,
) -> Result<E8s, FlightSuretyError> {
    require_authorized_caller(state, caller)?;
    let balance = state
        .policies
        .credit_balance(&passenger)
        .checked_add(amount)
        .ok_or_else(|| FlightSuretyError::InvalidInput("Credit balance overflows".to_string()))?;
    state.policies.set_credit_balance(&passenger, balance);
    metrics::record(state, |m| {
        m.credits_withdrawn_e8s = m.credits_withdrawn_e8s.saturating_sub(amount)
    });
    state.emit(LedgerEvent::CreditRestored {
        passenger,
        amount_e8s: amount,
    });
    log_warn!("Restored {} e8s credit to {}", amount, passenger);
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Timestamp;
    use crate::services::flight_service::register_flight;
    use crate::services::test_support::{fund_owner, new_ledger, principal, MockTransfer, LOGIC, OWNER};

    const DEPARTURE: Timestamp = 1_700_000_000;
    const PASSENGER: u8 = 20;

    fn ledger_with_flight() -> (LedgerState, FlightKey) {
        let mut state = new_ledger();
        fund_owner(&mut state);
        let key = register_flight(&mut state, principal(OWNER), "ND1309".into(), DEPARTURE).unwrap();
        (state, key)
    }

    #[test]
    fn payout_is_one_and_a_half_rounded_down() {
        assert_eq!(payout_for(INSURANCE_PRICE_LIMIT), 150_000_000);
        assert_eq!(payout_for(3), 4);
        assert_eq!(payout_for(1), 1);
        assert_eq!(payout_for(E8s::MAX), E8s::MAX);
    }

    #[test]
    fn premium_must_be_within_range() {
        let (mut state, key) = ledger_with_flight();
        let mut transfer = MockTransfer::default();
        let passenger = principal(PASSENGER);

        assert_eq!(
            insure_flight(&mut state, passenger, key.clone(), 0, &mut transfer),
            Err(FlightSuretyError::AmountOutOfRange)
        );
        assert_eq!(
            insure_flight(&mut state, passenger, key.clone(), INSURANCE_PRICE_LIMIT + 1, &mut transfer),
            Err(FlightSuretyError::AmountOutOfRange)
        );
        assert!(transfer.collected.is_empty());
        assert!(!is_passenger_insured(&state, &key, &passenger));
    }

    #[test]
    fn one_policy_per_passenger_and_flight() {
        let (mut state, key) = ledger_with_flight();
        let mut transfer = MockTransfer::default();
        let passenger = principal(PASSENGER);

        insure_flight(&mut state, passenger, key.clone(), INSURANCE_PRICE_LIMIT, &mut transfer).unwrap();
        assert!(is_passenger_insured(&state, &key, &passenger));
        assert_eq!(
            insure_flight(&mut state, passenger, key.clone(), 1, &mut transfer),
            Err(FlightSuretyError::DuplicatePolicy)
        );
        assert_eq!(transfer.collected, vec![(passenger, INSURANCE_PRICE_LIMIT)]);
        assert_eq!(state.policies.coverage(&key).liability_e8s, INSURANCE_PRICE_LIMIT);
    }

    #[test]
    fn unregistered_flight_is_not_insurable() {
        let (mut state, _) = ledger_with_flight();
        let unknown = FlightKey::new(principal(OWNER), "ZZ0", DEPARTURE);
        assert_eq!(
            insure_flight(&mut state, principal(PASSENGER), unknown, 1, &mut MockTransfer::default()),
            Err(FlightSuretyError::UnknownFlight)
        );
    }

    #[test]
    fn crediting_requires_authorized_caller_and_runs_once() {
        let (mut state, key) = ledger_with_flight();
        let passenger = principal(PASSENGER);
        insure_flight(&mut state, passenger, key.clone(), 100, &mut MockTransfer::default()).unwrap();

        assert_eq!(
            credit_insurees(&mut state, passenger, &key),
            Err(FlightSuretyError::Unauthorized)
        );
        assert_eq!(get_passenger_credit_balance(&state, &passenger), 0);

        let credits = credit_insurees(&mut state, principal(LOGIC), &key).unwrap();
        assert_eq!(credits, vec![(passenger, 150)]);
        assert!(get_policy(&state, &key, &passenger).unwrap().settled);

        assert!(credit_insurees(&mut state, principal(LOGIC), &key).unwrap().is_empty());
        assert_eq!(get_passenger_credit_balance(&state, &passenger), 150);
    }

    #[test]
    fn withdrawal_zeroes_balance_and_pays_once() {
        let (mut state, key) = ledger_with_flight();
        let passenger = principal(PASSENGER);
        let mut transfer = MockTransfer::default();

        assert_eq!(
            withdraw_credits(&mut state, passenger, &mut transfer),
            Err(FlightSuretyError::NoCreditBalance)
        );

        insure_flight(&mut state, passenger, key.clone(), 100, &mut transfer).unwrap();
        credit_insurees(&mut state, principal(LOGIC), &key).unwrap();

        assert_eq!(withdraw_credits(&mut state, passenger, &mut transfer), Ok(150));
        assert_eq!(get_passenger_credit_balance(&state, &passenger), 0);
        assert_eq!(transfer.disbursed, vec![(passenger, 150)]);
        assert_eq!(
            withdraw_credits(&mut state, passenger, &mut transfer),
            Err(FlightSuretyError::NoCreditBalance)
        );
    }

    #[test]
    fn failed_payout_restores_balance() {
        let (mut state, key) = ledger_with_flight();
        let passenger = principal(PASSENGER);
        insure_flight(&mut state, passenger, key.clone(), 100, &mut MockTransfer::default()).unwrap();
        credit_insurees(&mut state, principal(LOGIC), &key).unwrap();

        let result = withdraw_credits(&mut state, passenger, &mut MockTransfer::failing());
        assert!(matches!(result, Err(FlightSuretyError::TransferFailed(_))));
        assert_eq!(get_passenger_credit_balance(&state, &passenger), 150);
        assert_eq!(state.metrics.get().credits_withdrawn_e8s, 0);
    }

    #[test]
    fn restore_credit_is_internal() {
        let mut state = new_ledger();
        let passenger = principal(PASSENGER);
        assert_eq!(
            restore_credit(&mut state, passenger, passenger, 10),
            Err(FlightSuretyError::Unauthorized)
        );
        assert_eq!(restore_credit(&mut state, principal(LOGIC), passenger, 10), Ok(10));
        assert_eq!(get_passenger_credit_balance(&state, &passenger), 10);
    }
}
