// src/backend/utils/rng.rs
use crate::error::FlightSuretyError;
use crate::utils::log::{log_error, log_info};
use ic_cdk::api::management_canister::main::raw_rand;

/// Fetches a 32-byte seed for the ledger's index generator from the IC.
pub async fn fetch_seed() -> Result<[u8; 32], FlightSuretyError> {
    match raw_rand().await {
        Ok((bytes,)) => {
            if bytes.len() >= 32 {
                let seed: [u8; 32] = bytes[..32].try_into().map_err(|_| {
                    FlightSuretyError::StorageError("Failed to create seed from raw_rand".to_string())
                })?;
                log_info!("Fetched index generator seed from raw_rand.");
                Ok(seed)
            } else {
                log_error!("raw_rand returned insufficient bytes for seed");
                Err(FlightSuretyError::RandomnessUnavailable)
            }
        }
        Err((code, msg)) => {
            log_error!("Error fetching raw_rand: [{:?}] {}", code, msg);
            Err(FlightSuretyError::RandomnessUnavailable)
        }
    }
}

// `rand` pulls in getrandom; the canister never asks it for OS entropy.
#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn no_os_entropy(_buf: &mut [u8]) -> Result<(), getrandom::Error> {
    Err(getrandom::Error::UNSUPPORTED)
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
getrandom::register_custom_getrandom!(no_os_entropy);
