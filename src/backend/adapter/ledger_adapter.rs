// src/backend/adapter/ledger_adapter.rs
// Funds movement between participants and the ledger's ICP account.

use crate::error::FlightSuretyError;
use crate::models::common::{E8s, PrincipalId};
use crate::utils::log::{log_error, log_info};
use candid::Principal;
use ic_ledger_types::{
    transfer, AccountIdentifier, BlockIndex, Memo, Subaccount, Tokens, TransferArgs,
    DEFAULT_FEE, DEFAULT_SUBACCOUNT,
};

const DEPOSIT_SWEEP_MEMO: u64 = 0x4655_4e44; // "FUND"
const PAYOUT_MEMO: u64 = 0x5041_594f; // "PAYO"
const REFUND_MEMO: u64 = 0x5245_4644; // "REFD"

/// The collaborator services use to move value. Services call it after all
/// checks pass; inbound calls happen before state changes, outbound calls
/// after the balance has been zeroed.
pub trait FundsTransfer {
    /// Moves `amount` from `from` into the ledger.
    fn collect(&mut self, from: PrincipalId, amount: E8s) -> Result<(), FlightSuretyError>;

    /// Moves `amount` from the ledger to `to`.
    fn disburse(&mut self, to: PrincipalId, amount: E8s) -> Result<(), FlightSuretyError>;
}

/// Inbound side for the canister: the API has already swept `swept_e8s`
/// from the payer's deposit subaccount, so collecting up to that amount
/// from that payer succeeds.
pub struct DepositSweep {
    pub payer: PrincipalId,
    pub swept_e8s: E8s,
}

impl FundsTransfer for DepositSweep {
    fn collect(&mut self, from: PrincipalId, amount: E8s) -> Result<(), FlightSuretyError> {
        if from != self.payer || amount > self.swept_e8s {
            return Err(FlightSuretyError::TransferFailed(format!(
                "Deposit of {} e8s from {} does not cover {} e8s from {}",
                self.swept_e8s, self.payer, amount, from
            )));
        }
        self.swept_e8s -= amount;
        Ok(())
    }

    fn disburse(&mut self, _to: PrincipalId, _amount: E8s) -> Result<(), FlightSuretyError> {
        Err(FlightSuretyError::TransferFailed(
            "Deposit sweep cannot pay out".to_string(),
        ))
    }
}

/// Outbound side for the canister: payouts are queued and executed against
/// the ICP ledger by the API once the state change is committed.
#[derive(Default)]
pub struct PayoutOutbox {
    pub payouts: Vec<(PrincipalId, E8s)>,
}

impl FundsTransfer for PayoutOutbox {
    fn collect(&mut self, _from: PrincipalId, _amount: E8s) -> Result<(), FlightSuretyError> {
        Err(FlightSuretyError::TransferFailed(
            "Payout outbox cannot collect".to_string(),
        ))
    }

    fn disburse(&mut self, to: PrincipalId, amount: E8s) -> Result<(), FlightSuretyError> {
        self.payouts.push((to, amount));
        Ok(())
    }
}

/// Account a participant pays into before calling `fund`, `insure_flight`
/// or `register_oracle`.
pub fn deposit_account(canister: &Principal, payer: &PrincipalId) -> AccountIdentifier {
    AccountIdentifier::new(canister, &Subaccount::from(*payer))
}

/// Moves `amount` from the payer's deposit subaccount into the ledger pool.
pub async fn sweep_deposit(
    ledger_canister_id: Principal,
    payer: PrincipalId,
    amount: E8s,
) -> Result<BlockIndex, FlightSuretyError> {
    let canister = ic_cdk::api::id();
    let args = TransferArgs {
        memo: Memo(DEPOSIT_SWEEP_MEMO),
        amount: Tokens::from_e8s(amount),
        fee: DEFAULT_FEE,
        from_subaccount: Some(Subaccount::from(payer)),
        to: AccountIdentifier::new(&canister, &DEFAULT_SUBACCOUNT),
        created_at_time: None,
    };
    let block = execute_transfer(ledger_canister_id, args).await?;
    log_info!("Swept {} e8s deposit from {} (block {})", amount, payer, block);
    Ok(block)
}

/// Returns swept funds when the state change they paid for was rejected.
pub async fn refund_deposit(
    ledger_canister_id: Principal,
    payer: PrincipalId,
    amount: E8s,
) -> Result<BlockIndex, FlightSuretyError> {
    let args = TransferArgs {
        memo: Memo(REFUND_MEMO),
        amount: Tokens::from_e8s(amount),
        fee: DEFAULT_FEE,
        from_subaccount: None,
        to: AccountIdentifier::new(&payer, &DEFAULT_SUBACCOUNT),
        created_at_time: None,
    };
    execute_transfer(ledger_canister_id, args).await
}

/// Sends a withdrawn credit to the passenger's default account.
pub async fn pay_out(
    ledger_canister_id: Principal,
    to: PrincipalId,
    amount: E8s,
) -> Result<BlockIndex, FlightSuretyError> {
    let args = TransferArgs {
        memo: Memo(PAYOUT_MEMO),
        amount: Tokens::from_e8s(amount),
        fee: DEFAULT_FEE,
        from_subaccount: None,
        to: AccountIdentifier::new(&to, &DEFAULT_SUBACCOUNT),
        created_at_time: None,
    };
    let block = execute_transfer(ledger_canister_id, args).await?;
    log_info!("Paid out {} e8s to {} (block {})", amount, to, block);
    Ok(block)
}

async fn execute_transfer(
    ledger_canister_id: Principal,
    args: TransferArgs,
) -> Result<BlockIndex, FlightSuretyError> {
    match transfer(ledger_canister_id, args).await {
        Ok(Ok(block)) => Ok(block),
        Ok(Err(e)) => {
            log_error!("ICP ledger rejected transfer: {:?}", e);
            Err(FlightSuretyError::TransferFailed(format!("{:?}", e)))
        }
        Err((code, msg)) => {
            log_error!("ICP ledger call failed ({:?}): {}", code, msg);
            Err(FlightSuretyError::TransferFailed(msg))
        }
    }
}
