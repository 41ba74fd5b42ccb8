// src/backend/storage/config.rs
use crate::error::FlightSuretyError;
use crate::storage::memory::Memory;
use crate::storage::storable::Cbor;
use candid::{CandidType, Principal};
use ic_stable_structures::StableCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// Mainnet ICP ledger
pub const DEFAULT_LEDGER_CANISTER_ID: &str = "ryjl3-tyaaa-aaaaa-aaaba-cai";
pub const DEFAULT_MIN_CYCLES_THRESHOLD: u128 = 10_000_000_000; // 10B cycles

/// Access Guard state plus deployment settings.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GuardConfig {
    pub owner: Principal,
    pub operational: bool,
    pub authorized_callers: BTreeSet<Principal>,
    /// Identity the ledger acts under when one component calls into another.
    pub logic_caller: Principal,
    pub ledger_canister_id: Option<Principal>,
    pub min_cycles_threshold: u128,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            owner: Principal::anonymous(),
            operational: true,
            authorized_callers: BTreeSet::new(),
            logic_caller: Principal::management_canister(),
            ledger_canister_id: None,
            min_cycles_threshold: DEFAULT_MIN_CYCLES_THRESHOLD,
        }
    }
}

pub struct ConfigStore {
    cell: StableCell<Cbor<GuardConfig>, Memory>,
}

impl ConfigStore {
    pub fn init(memory: Memory) -> Result<Self, FlightSuretyError> {
        let cell = StableCell::init(memory, Cbor(GuardConfig::default())).map_err(|e| {
            FlightSuretyError::StorageError(format!("Failed to initialize guard config cell: {:?}", e))
        })?;
        Ok(Self { cell })
    }

    pub fn get(&self) -> GuardConfig {
        self.cell.get().0.clone()
    }

    pub fn set(&mut self, config: GuardConfig) -> Result<(), FlightSuretyError> {
        self.cell
            .set(Cbor(config))
            .map(|_old| ())
            .map_err(|e| FlightSuretyError::StorageError(format!("Failed to set guard config: {:?}", e)))
    }

    /// Read-modify-write of the guard config.
    pub fn update<F>(&mut self, update_fn: F) -> Result<(), FlightSuretyError>
    where
        F: FnOnce(&mut GuardConfig),
    {
        let mut config = self.get();
        update_fn(&mut config);
        self.set(config)
    }

    pub fn owner(&self) -> Principal {
        self.cell.get().0.owner
    }

    pub fn is_operational(&self) -> bool {
        self.cell.get().0.operational
    }

    pub fn logic_caller(&self) -> Principal {
        self.cell.get().0.logic_caller
    }

    pub fn is_authorized(&self, principal: &Principal) -> bool {
        self.cell.get().0.authorized_callers.contains(principal)
    }

    pub fn ledger_canister_id(&self) -> Result<Principal, FlightSuretyError> {
        match self.cell.get().0.ledger_canister_id {
            Some(id) => Ok(id),
            None => Principal::from_text(DEFAULT_LEDGER_CANISTER_ID).map_err(|_| {
                FlightSuretyError::InvalidInput("Invalid ICP ledger canister ID configured".to_string())
            }),
        }
    }

    pub fn min_cycles_threshold(&self) -> u128 {
        self.cell.get().0.min_cycles_threshold
    }
}
