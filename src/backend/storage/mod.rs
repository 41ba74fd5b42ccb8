// src/backend/storage/mod.rs
// Stable-memory tables and the state object that owns them.

pub mod airlines;
pub mod config;
pub mod events;
pub mod flights;
pub mod memory;
pub mod metrics;
pub mod oracles;
pub mod policies;
pub mod storable;

pub use memory::{LedgerMemory, Memory};
pub use storable::Cbor;

use crate::error::FlightSuretyError;
use crate::models::{airline::Airline, common::AirlineState, event::LedgerEvent, init::InitArgs};
use crate::utils::log::{log_info, log_warn};
use airlines::AirlineStore;
use config::{ConfigStore, GuardConfig, DEFAULT_MIN_CYCLES_THRESHOLD};
use events::EventLog;
use flights::FlightStore;
use ic_stable_structures::DefaultMemoryImpl;
use metrics::MetricsStore;
use oracles::OracleStore;
use policies::PolicyStore;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use std::collections::BTreeSet;

/// The whole ledger. Each component owns one disjoint group of tables;
/// services receive the state explicitly instead of reaching for globals.
pub struct LedgerState {
    pub config: ConfigStore,
    pub airlines: AirlineStore,
    pub flights: FlightStore,
    pub policies: PolicyStore,
    pub oracles: OracleStore,
    pub events: EventLog,
    pub metrics: MetricsStore,
    rng: Option<ChaCha20Rng>,
}

impl LedgerState {
    /// Attaches to the tables in `memory`, keeping whatever they hold.
    pub fn open(memory: DefaultMemoryImpl) -> Result<Self, FlightSuretyError> {
        let memory = LedgerMemory::init(memory);
        Ok(Self {
            config: ConfigStore::init(memory.guard_config())?,
            airlines: AirlineStore::init(memory.airlines(), memory.airline_count())?,
            flights: FlightStore::init(memory.flights()),
            policies: PolicyStore::init(memory.policies(), memory.coverage(), memory.credits()),
            oracles: OracleStore::init(memory.oracles(), memory.status_requests()),
            events: EventLog::init(memory.event_log_index(), memory.event_log_data())?,
            metrics: MetricsStore::init(memory.metrics())?,
            rng: None,
        })
    }

    /// Opens fresh tables, installs the owner and admits the owner as the
    /// first airline. `logic_caller` is authorized for internal call-throughs.
    pub fn bootstrap(
        memory: DefaultMemoryImpl,
        args: InitArgs,
        logic_caller: candid::Principal,
    ) -> Result<Self, FlightSuretyError> {
        let mut state = Self::open(memory)?;
        let mut authorized_callers = BTreeSet::new();
        authorized_callers.insert(logic_caller);
        state.config.set(GuardConfig {
            owner: args.owner,
            operational: true,
            authorized_callers,
            logic_caller,
            ledger_canister_id: args.ledger_canister_id,
            min_cycles_threshold: args
                .min_cycles_threshold
                .unwrap_or(DEFAULT_MIN_CYCLES_THRESHOLD),
        })?;

        let first_airline = Airline {
            state: AirlineState::Registered,
            ..Airline::applied(args.owner, args.first_airline_name.clone())
        };
        state.airlines.insert(&first_airline);
        state.airlines.increment_admitted()?;
        crate::metrics::record(&mut state, |m| m.airlines_admitted += 1);
        state.emit(LedgerEvent::AirlineRegistered {
            airline: args.owner,
            name: args.first_airline_name,
        });
        log_info!(
            "Ledger bootstrapped: owner={}, logic caller={}",
            args.owner,
            logic_caller
        );
        Ok(state)
    }

    /// Seeds the index generator. Called once randomness is available.
    pub fn reseed(&mut self, seed: [u8; 32]) {
        self.rng = Some(ChaCha20Rng::from_seed(seed));
    }

    pub fn is_seeded(&self) -> bool {
        self.rng.is_some()
    }

    pub(crate) fn rng(&mut self) -> Result<&mut ChaCha20Rng, FlightSuretyError> {
        self.rng.as_mut().ok_or(FlightSuretyError::RandomnessUnavailable)
    }

    /// Appends to the event log. Append failures are logged and the state
    /// change stands.
    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        if let Err(e) = self.events.append(event) {
            log_warn!("Dropped ledger event: {}", e);
        }
    }
}
