// src/backend/lib.rs

pub mod adapter;
pub mod api;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

use ic_stable_structures::DefaultMemoryImpl;
use models::init::InitArgs;
use std::time::Duration;
use storage::LedgerState;
use utils::log::{log_error, log_info};

#[ic_cdk::init]
fn init(args: InitArgs) {
    let owner = args.owner;
    match LedgerState::bootstrap(DefaultMemoryImpl::default(), args, ic_cdk::api::id()) {
        Ok(state) => api::install_state(state),
        Err(e) => ic_cdk::trap(&format!("Failed to bootstrap ledger: {}", e)),
    }
    schedule_reseed();
    log_info!("Flight surety ledger initialized, owner {}", owner);
}

#[ic_cdk::post_upgrade]
fn post_upgrade() {
    match LedgerState::open(DefaultMemoryImpl::default()) {
        Ok(state) => api::install_state(state),
        Err(e) => ic_cdk::trap(&format!("Failed to reattach ledger: {}", e)),
    }
    schedule_reseed();
    log_info!("Flight surety ledger upgraded");
}

/// `raw_rand` is an inter-canister call, so the seed is fetched from a timer
/// right after the lifecycle hook returns.
fn schedule_reseed() {
    ic_cdk_timers::set_timer(Duration::ZERO, || {
        ic_cdk::spawn(async {
            match utils::rng::fetch_seed().await {
                Ok(seed) => {
                    if let Err(e) = api::with_state_mut(|state| {
                        state.reseed(seed);
                        Ok(())
                    }) {
                        log_error!("Failed to seed index generator: {}", e);
                    }
                }
                Err(e) => log_error!("Index generator left unseeded: {}", e),
            }
        })
    });
}
