// Shared fixtures for service tests.

use crate::adapter::ledger_adapter::FundsTransfer;
use crate::error::FlightSuretyError;
use crate::models::{
    common::{E8s, PrincipalId},
    init::InitArgs,
};
use crate::services::airline_service::{self, MINIMUM_FUNDS};
use crate::storage::LedgerState;
use candid::Principal;
use ic_stable_structures::DefaultMemoryImpl;

pub const OWNER: u8 = 1;
pub const LOGIC: u8 = 250;
pub const SEED: [u8; 32] = [9; 32];

pub fn principal(id: u8) -> Principal {
    Principal::from_slice(&[id; 29])
}

/// A seeded ledger whose owner is the first (registered, unfunded) airline.
pub fn new_ledger() -> LedgerState {
    let args = InitArgs {
        owner: principal(OWNER),
        first_airline_name: "First Air".to_string(),
        ledger_canister_id: None,
        min_cycles_threshold: None,
    };
    let mut state = LedgerState::bootstrap(DefaultMemoryImpl::default(), args, principal(LOGIC))
        .expect("bootstrap ledger");
    state.reseed(SEED);
    state
}

/// Records every collaborator call; fails all calls when `fail` is set.
#[derive(Default)]
pub struct MockTransfer {
    pub collected: Vec<(PrincipalId, E8s)>,
    pub disbursed: Vec<(PrincipalId, E8s)>,
    pub fail: bool,
}

impl MockTransfer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl FundsTransfer for MockTransfer {
    fn collect(&mut self, from: PrincipalId, amount: E8s) -> Result<(), FlightSuretyError> {
        if self.fail {
            return Err(FlightSuretyError::TransferFailed("mock collect failure".to_string()));
        }
        self.collected.push((from, amount));
        Ok(())
    }

    fn disburse(&mut self, to: PrincipalId, amount: E8s) -> Result<(), FlightSuretyError> {
        if self.fail {
            return Err(FlightSuretyError::TransferFailed("mock disburse failure".to_string()));
        }
        self.disbursed.push((to, amount));
        Ok(())
    }
}

/// Funds the owner airline so it can act.
pub fn fund_owner(state: &mut LedgerState) {
    airline_service::fund(state, principal(OWNER), MINIMUM_FUNDS, &mut MockTransfer::default())
        .expect("fund owner");
}

/// Owner registers and funds airlines `ids` while direct registration applies.
pub fn admit_and_fund(state: &mut LedgerState, ids: &[u8]) {
    for id in ids {
        airline_service::register_airline(state, principal(OWNER), format!("Airline {}", id), principal(*id))
            .expect("register airline");
        airline_service::fund(state, principal(*id), MINIMUM_FUNDS, &mut MockTransfer::default())
            .expect("fund airline");
    }
}
