// src/backend/utils/guards.rs
use crate::error::FlightSuretyError;
use crate::utils::log::log_warn;
use ic_cdk::api::canister_balance128;

/// Checks if the canister has sufficient cycles.
///
/// # Errors
///
/// Returns `FlightSuretyError::CycleLow` if the balance is below the threshold.
pub fn check_cycles(min_cycles_threshold: u128) -> Result<(), FlightSuretyError> {
    let balance = canister_balance128();
    if balance < min_cycles_threshold {
        log_warn!(
            "Cycle balance low: {} cycles, threshold: {}",
            balance,
            min_cycles_threshold
        );
        Err(FlightSuretyError::CycleLow)
    } else {
        Ok(())
    }
}
