// src/backend/services/access_guard.rs
// Operational switch and caller allow-list. Every mutating service call
// starts with `require_operational`.

use crate::error::FlightSuretyError;
use crate::models::{common::PrincipalId, event::LedgerEvent};
use crate::storage::LedgerState;
use crate::utils::log::log_info;

/// Fails with `NotOperational` while the ledger is paused.
pub fn require_operational(state: &LedgerState) -> Result<(), FlightSuretyError> {
    if state.config.is_operational() {
        Ok(())
    } else {
        Err(FlightSuretyError::NotOperational)
    }
}

/// Fails with `Unauthorized` unless `caller` is the owner.
pub fn require_owner(state: &LedgerState, caller: PrincipalId) -> Result<(), FlightSuretyError> {
    if state.config.owner() == caller {
        Ok(())
    } else {
        Err(FlightSuretyError::Unauthorized)
    }
}

/// Fails with `Unauthorized` unless `caller` is the owner or on the allow-list.
pub fn require_authorized_caller(
    state: &LedgerState,
    caller: PrincipalId,
) -> Result<(), FlightSuretyError> {
    if state.config.owner() == caller || state.config.is_authorized(&caller) {
        Ok(())
    } else {
        Err(FlightSuretyError::Unauthorized)
    }
}

pub fn is_operational(state: &LedgerState) -> bool {
    state.config.is_operational()
}

/// Owner only. Setting the current value again is allowed.
pub fn set_operational(
    state: &mut LedgerState,
    caller: PrincipalId,
    operational: bool,
) -> Result<(), FlightSuretyError> {
    require_owner(state, caller)?;
    state.config.update(|config| config.operational = operational)?;
    state.emit(LedgerEvent::OperationalChanged { operational });
    log_info!("Operational status set to {} by {}", operational, caller);
    Ok(())
}

pub fn authorize_caller(
    state: &mut LedgerState,
    caller: PrincipalId,
    principal: PrincipalId,
) -> Result<(), FlightSuretyError> {
    require_owner(state, caller)?;
    state.config.update(|config| {
        config.authorized_callers.insert(principal);
    })?;
    log_info!("Caller {} authorized by {}", principal, caller);
    Ok(())
}

/// Owner only. The logic identity cannot be revoked: oracle payouts and
/// credit restores act under it.
pub fn revoke_caller(
    state: &mut LedgerState,
    caller: PrincipalId,
    principal: PrincipalId,
) -> Result<(), FlightSuretyError> {
    require_owner(state, caller)?;
    if principal == state.config.logic_caller() {
        return Err(FlightSuretyError::InvalidInput(
            "The ledger's logic identity cannot be revoked".to_string(),
        ));
    }
    state.config.update(|config| {
        config.authorized_callers.remove(&principal);
    })?;
    log_info!("Caller {} revoked by {}", principal, caller);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{new_ledger, principal, LOGIC, OWNER};

    #[test]
    fn ledger_starts_operational() {
        let state = new_ledger();
        assert!(is_operational(&state));
        assert_eq!(require_operational(&state), Ok(()));
    }

    #[test]
    fn only_owner_can_toggle_operational() {
        let mut state = new_ledger();
        assert_eq!(
            set_operational(&mut state, principal(42), false),
            Err(FlightSuretyError::Unauthorized)
        );
        assert!(is_operational(&state));

        set_operational(&mut state, principal(OWNER), false).unwrap();
        assert_eq!(require_operational(&state), Err(FlightSuretyError::NotOperational));

        // Idempotent toggle
        set_operational(&mut state, principal(OWNER), false).unwrap();
        set_operational(&mut state, principal(OWNER), true).unwrap();
        assert!(is_operational(&state));
    }

    #[test]
    fn authorized_callers_follow_the_allow_list() {
        let mut state = new_ledger();
        let app = principal(77);
        assert_eq!(
            require_authorized_caller(&state, app),
            Err(FlightSuretyError::Unauthorized)
        );
        assert_eq!(
            authorize_caller(&mut state, app, app),
            Err(FlightSuretyError::Unauthorized)
        );

        authorize_caller(&mut state, principal(OWNER), app).unwrap();
        assert_eq!(require_authorized_caller(&state, app), Ok(()));

        revoke_caller(&mut state, principal(OWNER), app).unwrap();
        assert_eq!(
            require_authorized_caller(&state, app),
            Err(FlightSuretyError::Unauthorized)
        );
        assert_eq!(require_authorized_caller(&state, principal(OWNER)), Ok(()));
    }

    #[test]
    fn logic_identity_stays_authorized() {
        let mut state = new_ledger();
        assert!(matches!(
            revoke_caller(&mut state, principal(OWNER), principal(LOGIC)),
            Err(FlightSuretyError::InvalidInput(_))
        ));
        assert_eq!(require_authorized_caller(&state, principal(LOGIC)), Ok(()));
    }
}
