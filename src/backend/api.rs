// src/backend/api.rs
// Candid endpoints. Each binds `caller()` to the explicit caller of a
// service call and moves ICP around the synchronous core.

use crate::{
    adapter::ledger_adapter::{self, DepositSweep, PayoutOutbox},
    error::FlightSuretyError,
    metrics::LedgerMetrics,
    models::{
        airline::Airline,
        common::{AirlineState, E8s, FlightKey, OracleIndex, PrincipalId, StatusCode, Timestamp},
        event::EventRecord,
        flight::Flight,
        init::InitArgs,
        oracle::{ResponseOutcome, StatusRequest},
        policy::InsurancePolicy,
    },
    services::{access_guard, airline_service, flight_service, insurance_service, oracle_service},
    storage::LedgerState,
    utils::{
        guards::check_cycles,
        log::{log_error, log_info, log_warn},
        rng::fetch_seed,
    },
};
use candid::{CandidType, Deserialize, Principal};
use ic_cdk::api::canister_balance128;
use ic_cdk::caller;
use ic_cdk_macros::{query, update};
use serde::Serialize;
use std::cell::RefCell;
use validator::Validate;

thread_local! {
    static STATE: RefCell<Option<LedgerState>> = const { RefCell::new(None) };
}

pub(crate) fn install_state(state: LedgerState) {
    STATE.with(|cell| *cell.borrow_mut() = Some(state));
}

pub(crate) fn with_state<R>(
    f: impl FnOnce(&LedgerState) -> Result<R, FlightSuretyError>,
) -> Result<R, FlightSuretyError> {
    STATE.with(|cell| match cell.borrow().as_ref() {
        Some(state) => f(state),
        None => Err(not_initialized()),
    })
}

pub(crate) fn with_state_mut<R>(
    f: impl FnOnce(&mut LedgerState) -> Result<R, FlightSuretyError>,
) -> Result<R, FlightSuretyError> {
    STATE.with(|cell| match cell.borrow_mut().as_mut() {
        Some(state) => f(state),
        None => Err(not_initialized()),
    })
}

fn not_initialized() -> FlightSuretyError {
    FlightSuretyError::StorageError("Ledger state is not initialized".to_string())
}

// --- Guards & validation ---

fn cycles_guard() -> Result<(), FlightSuretyError> {
    let threshold = with_state(|state| Ok(state.config.min_cycles_threshold()))?;
    check_cycles(threshold)
}

fn validate_request<T: Validate>(req: &T) -> Result<(), FlightSuretyError> {
    req.validate()
        .map_err(|e| FlightSuretyError::InvalidInput(e.to_string()))
}

/// Sweeps `amount` from the payer's deposit subaccount, then runs `op`
/// against the swept funds. A rejected `op` gets its deposit refunded.
async fn collect_deposit<T>(
    payer: PrincipalId,
    amount: E8s,
    op: impl FnOnce(&mut LedgerState, &mut DepositSweep) -> Result<T, FlightSuretyError>,
) -> Result<T, FlightSuretyError> {
    let ledger = with_state(|state| state.config.ledger_canister_id())?;
    ledger_adapter::sweep_deposit(ledger, payer, amount).await?;

    let mut sweep = DepositSweep {
        payer,
        swept_e8s: amount,
    };
    let result = with_state_mut(|state| op(state, &mut sweep));
    if let Err(e) = &result {
        log_warn!("Refunding {} e8s to {} after rejected call: {}", amount, payer, e);
        if let Err(refund_err) = ledger_adapter::refund_deposit(ledger, payer, amount).await {
            log_error!("Refund of {} e8s to {} failed: {}", amount, payer, refund_err);
        }
    }
    result
}

// --- Request/Response structs ---

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct RegisterAirlineRequest {
    pub airline_id: Principal,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct RegisterFlightRequest {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    pub timestamp: Timestamp,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct FlightRef {
    pub airline: Principal,
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    pub timestamp: Timestamp,
}

impl FlightRef {
    fn key(self) -> FlightKey {
        FlightKey::new(self.airline, self.code, self.timestamp)
    }
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct InsureFlightRequest {
    #[validate(nested)]
    pub flight: FlightRef,
    #[validate(range(min = 1))]
    pub amount_e8s: E8s,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct OracleResponseRequest {
    pub index: OracleIndex,
    #[validate(nested)]
    pub flight: FlightRef,
    /// Wire status code: 0, 10, 20, 30, 40 or 50.
    pub status_code: u8,
}

#[derive(CandidType, Deserialize, Validate)]
pub struct ListEventsRequest {
    pub offset: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
}

#[derive(CandidType, Deserialize, Clone, Debug, Default)]
pub struct ListEventsResponse {
    pub events: Vec<EventRecord>,
    pub total: u64,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default)]
pub struct GetMetricsResponse {
    pub metrics: LedgerMetrics,
    pub airlines_count: u64,
    pub cycle_balance: u128,
}

// --- Access Guard ---

#[query]
fn is_operational() -> bool {
    with_state(|state| Ok(access_guard::is_operational(state))).unwrap_or(false)
}

#[update]
fn set_operational(mode: bool) -> Result<(), FlightSuretyError> {
    let caller = caller();
    with_state_mut(|state| access_guard::set_operational(state, caller, mode))
}

#[update]
fn authorize_caller(principal: Principal) -> Result<(), FlightSuretyError> {
    let caller = caller();
    with_state_mut(|state| access_guard::authorize_caller(state, caller, principal))
}

#[update]
fn revoke_caller(principal: Principal) -> Result<(), FlightSuretyError> {
    let caller = caller();
    with_state_mut(|state| access_guard::revoke_caller(state, caller, principal))
}

/// Owner-only retry for when the seed fetch after install or upgrade failed.
#[update]
async fn reseed_index_generator() -> Result<(), FlightSuretyError> {
    let caller = caller();
    with_state(|state| access_guard::require_owner(state, caller))?;
    let seed = fetch_seed().await?;
    with_state_mut(|state| {
        state.reseed(seed);
        Ok(())
    })?;
    log_info!("Index generator reseeded by {}", caller);
    Ok(())
}

// --- Airline Registry ---

#[update]
fn register_airline(req: RegisterAirlineRequest) -> Result<AirlineState, FlightSuretyError> {
    validate_request(&req)?;
    cycles_guard()?;
    let caller = caller();
    with_state_mut(|state| airline_service::register_airline(state, caller, req.name, req.airline_id))
}

/// Funds the calling airline from its deposit subaccount.
#[update]
async fn fund(amount_e8s: E8s) -> Result<Airline, FlightSuretyError> {
    cycles_guard()?;
    let caller = caller();
    with_state(|state| airline_service::validate_funding(state, caller, amount_e8s).map(|_| ()))?;
    collect_deposit(caller, amount_e8s, |state, sweep| {
        airline_service::fund(state, caller, amount_e8s, sweep)
    })
    .await
}

#[query]
fn is_airline_registered(airline: Principal) -> bool {
    with_state(|state| Ok(airline_service::is_registered(state, &airline))).unwrap_or(false)
}

#[query]
fn is_airline_funded(airline: Principal) -> bool {
    with_state(|state| Ok(airline_service::is_funded(state, &airline))).unwrap_or(false)
}

#[query]
fn airlines_count() -> u64 {
    with_state(|state| Ok(airline_service::airlines_count(state))).unwrap_or(0)
}

#[query]
fn get_airline(airline: Principal) -> Option<Airline> {
    with_state(|state| Ok(airline_service::get_airline(state, &airline)))
        .ok()
        .flatten()
}

#[query]
fn list_airlines() -> Vec<Airline> {
    with_state(|state| Ok(airline_service::list_airlines(state))).unwrap_or_default()
}

// --- Flight Registry ---

#[update]
fn register_flight(req: RegisterFlightRequest) -> Result<FlightKey, FlightSuretyError> {
    validate_request(&req)?;
    cycles_guard()?;
    let caller = caller();
    with_state_mut(|state| flight_service::register_flight(state, caller, req.code, req.timestamp))
}

#[query]
fn is_flight_registered(airline: Principal, code: String, timestamp: Timestamp) -> bool {
    let key = FlightKey::new(airline, code, timestamp);
    with_state(|state| Ok(flight_service::is_flight_registered(state, &key))).unwrap_or(false)
}

#[query]
fn get_flight(airline: Principal, code: String, timestamp: Timestamp) -> Option<Flight> {
    let key = FlightKey::new(airline, code, timestamp);
    with_state(|state| Ok(flight_service::get_flight(state, &key)))
        .ok()
        .flatten()
}

#[query]
fn list_flights(airline: Principal) -> Vec<Flight> {
    with_state(|state| Ok(flight_service::flights_by_airline(state, &airline))).unwrap_or_default()
}

// --- Insurance Ledger ---

/// Buys a policy with funds the caller placed in its deposit subaccount.
#[update]
async fn insure_flight(req: InsureFlightRequest) -> Result<InsurancePolicy, FlightSuretyError> {
    validate_request(&req)?;
    cycles_guard()?;
    let passenger = caller();
    let amount = req.amount_e8s;
    let key = req.flight.key();
    with_state(|state| insurance_service::validate_insurance(state, passenger, &key, amount))?;
    collect_deposit(passenger, amount, |state, sweep| {
        insurance_service::insure_flight(state, passenger, key, amount, sweep)
    })
    .await
}

#[query]
fn is_passenger_insured(airline: Principal, code: String, timestamp: Timestamp, passenger: Principal) -> bool {
    let key = FlightKey::new(airline, code, timestamp);
    with_state(|state| Ok(insurance_service::is_passenger_insured(state, &key, &passenger))).unwrap_or(false)
}

#[query]
fn get_policy(airline: Principal, code: String, timestamp: Timestamp, passenger: Principal) -> Option<InsurancePolicy> {
    let key = FlightKey::new(airline, code, timestamp);
    with_state(|state| Ok(insurance_service::get_policy(state, &key, &passenger)))
        .ok()
        .flatten()
}

/// Credit balance of the caller.
#[query]
fn get_passenger_credit_balance() -> E8s {
    let passenger = caller();
    with_state(|state| Ok(insurance_service::get_passenger_credit_balance(state, &passenger))).unwrap_or(0)
}

/// Withdraws the caller's whole credit to its default ICP account. The
/// balance is committed as zero before the ledger transfer; a failed
/// transfer puts it back.
#[update]
async fn withdraw_credits() -> Result<E8s, FlightSuretyError> {
    cycles_guard()?;
    let passenger = caller();
    let ledger = with_state(|state| state.config.ledger_canister_id())?;
    let mut outbox = PayoutOutbox::default();
    let withdrawn =
        with_state_mut(|state| insurance_service::withdraw_credits(state, passenger, &mut outbox))?;

    for (to, amount) in outbox.payouts {
        if let Err(e) = ledger_adapter::pay_out(ledger, to, amount).await {
            let restored = with_state_mut(|state| {
                let logic_caller = state.config.logic_caller();
                insurance_service::restore_credit(state, logic_caller, to, amount)
            });
            if let Err(restore_err) = restored {
                log_error!("Could not restore {} e8s credit to {}: {}", amount, to, restore_err);
            }
            return Err(e);
        }
    }
    Ok(withdrawn)
}

/// ICP account (hex) the caller pays into before `fund`, `insure_flight`
/// or `register_oracle`.
#[query]
fn deposit_account() -> String {
    ledger_adapter::deposit_account(&ic_cdk::api::id(), &caller()).to_hex()
}

// --- Oracle Consensus ---

#[update]
async fn register_oracle(fee_e8s: E8s) -> Result<Vec<OracleIndex>, FlightSuretyError> {
    cycles_guard()?;
    let oracle = caller();
    with_state(|state| oracle_service::validate_oracle_registration(state, oracle, fee_e8s))?;
    let indexes = collect_deposit(oracle, fee_e8s, |state, sweep| {
        oracle_service::register_oracle(state, oracle, fee_e8s, sweep)
    })
    .await?;
    Ok(indexes.to_vec())
}

#[query]
fn get_my_indexes() -> Option<Vec<OracleIndex>> {
    let oracle = caller();
    with_state(|state| Ok(oracle_service::get_oracle_indexes(state, &oracle)))
        .ok()
        .flatten()
        .map(|indexes| indexes.to_vec())
}

#[update]
fn fetch_flight_status(req: FlightRef) -> Result<OracleIndex, FlightSuretyError> {
    validate_request(&req)?;
    cycles_guard()?;
    let caller = caller();
    with_state_mut(|state| oracle_service::fetch_flight_status(state, caller, req.key()))
}

#[update]
fn submit_oracle_response(req: OracleResponseRequest) -> Result<ResponseOutcome, FlightSuretyError> {
    validate_request(&req)?;
    cycles_guard()?;
    let status = StatusCode::try_from(req.status_code)?;
    let oracle = caller();
    with_state_mut(|state| {
        oracle_service::submit_oracle_response(state, oracle, req.flight.key(), req.index, status)
    })
}

#[query]
fn get_status_request(airline: Principal, code: String, timestamp: Timestamp) -> Option<StatusRequest> {
    let key = FlightKey::new(airline, code, timestamp);
    with_state(|state| Ok(oracle_service::get_status_request(state, &key)))
        .ok()
        .flatten()
}

#[query]
fn list_open_requests() -> Vec<StatusRequest> {
    with_state(|state| Ok(oracle_service::open_requests(state))).unwrap_or_default()
}

// --- Events & metrics ---

#[query]
fn get_events(req: ListEventsRequest) -> Result<ListEventsResponse, FlightSuretyError> {
    validate_request(&req)?;
    with_state(|state| {
        Ok(ListEventsResponse {
            events: state
                .events
                .page(req.offset.unwrap_or(0), req.limit.unwrap_or(50)),
            total: state.events.len(),
        })
    })
}

#[query]
fn get_metrics() -> Result<GetMetricsResponse, FlightSuretyError> {
    with_state(|state| {
        Ok(GetMetricsResponse {
            metrics: state.metrics.get(),
            airlines_count: airline_service::airlines_count(state),
            cycle_balance: canister_balance128(),
        })
    })
}

ic_cdk::export_candid!();
