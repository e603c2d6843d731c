//! # Multisender Contract
//!
//! Disburses native value, a fungible asset or a non-fungible asset to an
//! arbitrary list of recipients in one invocation.
//!
//! ## Features
//! - One batch engine shared by the three asset kinds
//! - Budget guard re-evaluated before every transfer, aborting early with the
//!   index a caller can resume from (`start_offset`)
//! - Failed transfers do not stop the loop; every failed recipient is reported
//!   at once and the whole batch is rolled back
//! - Per-batch events and lifetime statistics for committed batches
//!
//! ## Diagnostics
//! Aborted batches fail the invocation with a [`MultisenderError`] code. The
//! full diagnostic text (for instance `will run out of gas at index 123 in 123`)
//! is written to the diagnostic log as text, which survives the rollback when
//! the invocation is simulated.

#![no_std]

mod adapters;
mod cost;
mod engine;
mod failures;
mod guard;
mod meter;
mod types;
mod validation;

use soroban_sdk::{contract, contractimpl, log, panic_with_error, token, Address, Bytes, Env, Vec};

pub use crate::adapters::{
    Disburse, FungibleAdapter, NativeAdapter, NonFungibleAdapter, NonFungibleClient,
    NonFungibleInterface, TransferOutcome,
};
pub use crate::cost::{
    required_budget, ENTRY_CREATION_COST, FUNGIBLE_CALL_COST, FUNGIBLE_TRANSFER_COST,
    GUARD_CHECK_COST, NATIVE_CALL_COST, NATIVE_TRANSFER_COST, NON_FUNGIBLE_CALL_COST,
    NON_FUNGIBLE_TRANSFER_COST, SAFETY_MARGIN,
};
pub use crate::engine::{estimate_budget, Batch, DisburseError, DIAGNOSTIC_CHUNK};
pub use crate::failures::FailureSet;
pub use crate::meter::{Allowance, Meter};
pub use crate::types::{AssetKind, BatchReceipt, DataKey, DisburseEvents, NftTransfer};
use crate::validation::{total_amount, validate_amounts, validate_attached};

/// Error codes for the multisender contract.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MultisenderError {
    /// Contract not initialized
    NotInitialized = 1,
    /// Caller is not authorized
    Unauthorized = 2,
    /// Recipient and payload lists differ in length
    LengthMismatch = 3,
    /// Start offset lies past the end of the recipient list
    InvalidStartOffset = 4,
    /// Negative or overflowing amount
    InvalidAmount = 5,
    /// Attached native value differs from the disbursed total
    ValueMismatch = 6,
    /// Remaining budget cannot cover the rest of the batch
    BudgetExhausted = 7,
    /// At least one recipient could not be paid
    PartialFailure = 8,
}

impl From<MultisenderError> for soroban_sdk::Error {
    fn from(e: MultisenderError) -> Self {
        soroban_sdk::Error::from_contract_error(e as u32)
    }
}

#[contract]
pub struct MultisenderContract;

#[contractimpl]
impl MultisenderContract {
    /// Initializes the contract.
    ///
    /// # Arguments
    /// * `admin` - Address allowed to change the configuration
    /// * `native_token` - Stellar asset contract of the native asset
    /// * `batch_budget` - Units one batch may draw, see [`Self::estimate_fungible`]
    pub fn initialize(env: Env, admin: Address, native_token: Address, batch_budget: u64) {
        if env.storage().instance().has(&DataKey::Admin) {
            panic!("Contract already initialized");
        }

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::NativeToken, &native_token);
        env.storage()
            .instance()
            .set(&DataKey::BatchBudget, &batch_budget);
        env.storage().instance().set(&DataKey::TotalBatches, &0u64);
        env.storage()
            .instance()
            .set(&DataKey::TotalDisbursed, &0u64);
    }

    /// Sends native value to every recipient from `start_offset` on.
    ///
    /// `attached` is pulled from `caller` into the contract first and must
    /// equal the sum of the amounts being disbursed.
    pub fn disburse_native(
        env: Env,
        caller: Address,
        recipients: Vec<Address>,
        amounts: Vec<i128>,
        start_offset: u32,
        attached: i128,
    ) -> BatchReceipt {
        caller.require_auth();
        let native_token = Self::get_native_token(env.clone());

        let batch =
            Batch::new(recipients, amounts, start_offset).unwrap_or_else(|e| Self::abort(&env, e));
        let total = Self::checked_total(&env, batch.payloads(), start_offset);
        if let Err(e) = validate_attached(attached, total) {
            log!(&env, "attached value mismatch", attached, total);
            panic_with_error!(&env, MultisenderError::from(e));
        }

        let custodian = env.current_contract_address();
        if attached > 0 {
            token::Client::new(&env, &native_token).transfer(&caller, &custodian, &attached);
        }

        let adapter = NativeAdapter::new(&env, &native_token, &custodian);
        Self::execute(&env, &caller, AssetKind::Native, &batch, &adapter, total)
    }

    /// Sends `asset` from `caller` to every recipient from `start_offset` on.
    ///
    /// The caller must have approved this contract for at least the total.
    pub fn disburse_fungible(
        env: Env,
        caller: Address,
        asset: Address,
        recipients: Vec<Address>,
        amounts: Vec<i128>,
        start_offset: u32,
    ) -> BatchReceipt {
        caller.require_auth();

        let batch =
            Batch::new(recipients, amounts, start_offset).unwrap_or_else(|e| Self::abort(&env, e));
        let total = Self::checked_total(&env, batch.payloads(), start_offset);

        let adapter = FungibleAdapter::new(&env, &asset, &env.current_contract_address(), &caller);
        Self::execute(&env, &caller, AssetKind::Fungible, &batch, &adapter, total)
    }

    /// Sends one token of the `asset` collection to each recipient, forwarding
    /// the matching entry of `data`.
    ///
    /// The caller must have approved this contract as an operator.
    pub fn disburse_non_fungible(
        env: Env,
        caller: Address,
        asset: Address,
        recipients: Vec<Address>,
        token_ids: Vec<u128>,
        data: Vec<Bytes>,
        start_offset: u32,
    ) -> BatchReceipt {
        caller.require_auth();

        for payloads in [token_ids.len(), data.len()] {
            if payloads != recipients.len() {
                Self::abort(
                    &env,
                    DisburseError::LengthMismatch {
                        recipients: recipients.len(),
                        payloads,
                    },
                );
            }
        }

        let mut transfers: Vec<NftTransfer> = Vec::new(&env);
        for (token_id, data) in token_ids.iter().zip(data.iter()) {
            transfers.push_back(NftTransfer { token_id, data });
        }

        let batch = Batch::new(recipients, transfers, start_offset)
            .unwrap_or_else(|e| Self::abort(&env, e));
        let volume = batch.pending() as i128;

        let adapter =
            NonFungibleAdapter::new(&env, &asset, &env.current_contract_address(), &caller);
        Self::execute(&env, &caller, AssetKind::NonFungible, &batch, &adapter, volume)
    }

    /// Smallest `batch_budget` with which `disburse_native` over the same
    /// recipients and offset commits, provided every transfer goes through.
    pub fn estimate_native(env: Env, recipients: Vec<Address>, start_offset: u32) -> u64 {
        Self::check_offset(&env, &recipients, start_offset);
        let adapter = NativeAdapter::new(
            &env,
            &Self::get_native_token(env.clone()),
            &env.current_contract_address(),
        );
        estimate_budget(&env, &adapter, &recipients, start_offset)
    }

    /// Smallest `batch_budget` with which `disburse_fungible` of `asset` over
    /// the same recipients and offset commits.
    pub fn estimate_fungible(
        env: Env,
        asset: Address,
        recipients: Vec<Address>,
        start_offset: u32,
    ) -> u64 {
        Self::check_offset(&env, &recipients, start_offset);
        let engine = env.current_contract_address();
        let adapter = FungibleAdapter::new(&env, &asset, &engine, &engine);
        estimate_budget(&env, &adapter, &recipients, start_offset)
    }

    /// Smallest `batch_budget` with which `disburse_non_fungible` of the
    /// `asset` collection over the same recipients and offset commits.
    pub fn estimate_non_fungible(
        env: Env,
        asset: Address,
        recipients: Vec<Address>,
        start_offset: u32,
    ) -> u64 {
        Self::check_offset(&env, &recipients, start_offset);
        let engine = env.current_contract_address();
        let adapter = NonFungibleAdapter::new(&env, &asset, &engine, &engine);
        estimate_budget(&env, &adapter, &recipients, start_offset)
    }

    /// Returns the admin address.
    pub fn get_admin(env: Env) -> Address {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .unwrap_or_else(|| panic_with_error!(&env, MultisenderError::NotInitialized))
    }

    /// Updates the admin address.
    pub fn set_admin(env: Env, current_admin: Address, new_admin: Address) {
        current_admin.require_auth();
        Self::require_admin(&env, &current_admin);

        env.storage().instance().set(&DataKey::Admin, &new_admin);
    }

    pub fn get_native_token(env: Env) -> Address {
        env.storage()
            .instance()
            .get(&DataKey::NativeToken)
            .unwrap_or_else(|| panic_with_error!(&env, MultisenderError::NotInitialized))
    }

    /// Returns the number of units one batch may draw.
    pub fn get_batch_budget(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::BatchBudget)
            .unwrap_or_else(|| panic_with_error!(&env, MultisenderError::NotInitialized))
    }

    /// Updates the number of units one batch may draw.
    pub fn set_batch_budget(env: Env, admin: Address, batch_budget: u64) {
        admin.require_auth();
        Self::require_admin(&env, &admin);

        env.storage()
            .instance()
            .set(&DataKey::BatchBudget, &batch_budget);
    }

    /// Returns the number of committed batches.
    pub fn get_total_batches(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::TotalBatches)
            .unwrap_or(0)
    }

    /// Returns the number of transfers made by committed batches.
    pub fn get_total_disbursed(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::TotalDisbursed)
            .unwrap_or(0)
    }

    fn execute<D: Disburse>(
        env: &Env,
        caller: &Address,
        kind: AssetKind,
        batch: &Batch<D::Payload>,
        disburser: &D,
        volume: i128,
    ) -> BatchReceipt {
        DisburseEvents::batch_started(env, caller, kind, batch.len(), batch.start_offset());

        let mut meter = Allowance::new(Self::get_batch_budget(env.clone()));
        let disbursed = batch
            .run(env, disburser, &mut meter)
            .unwrap_or_else(|e| Self::abort(env, e));

        let batch_id = Self::get_total_batches(env.clone()) + 1;
        let total_disbursed = Self::get_total_disbursed(env.clone()) + disbursed as u64;
        env.storage()
            .instance()
            .set(&DataKey::TotalBatches, &batch_id);
        env.storage()
            .instance()
            .set(&DataKey::TotalDisbursed, &total_disbursed);

        let receipt = BatchReceipt {
            batch_id,
            kind,
            recipients: batch.len(),
            start_offset: batch.start_offset(),
            disbursed,
            volume,
            budget_used: meter.used(),
        };
        DisburseEvents::batch_committed(env, &receipt);
        receipt
    }

    fn check_offset(env: &Env, recipients: &Vec<Address>, start_offset: u32) {
        if start_offset > recipients.len() {
            Self::abort(
                env,
                DisburseError::InvalidStartOffset {
                    start_offset,
                    total: recipients.len(),
                },
            );
        }
    }

    fn checked_total(env: &Env, amounts: &Vec<i128>, start_offset: u32) -> i128 {
        validate_amounts(amounts)
            .and_then(|_| total_amount(amounts, start_offset))
            .unwrap_or_else(|e| panic_with_error!(env, MultisenderError::from(e)))
    }

    /// Fails the invocation, discarding every effect of the batch.
    fn abort(env: &Env, err: DisburseError) -> ! {
        err.log(env);
        panic_with_error!(env, err.code())
    }

    // Internal helper to verify admin
    fn require_admin(env: &Env, caller: &Address) {
        let admin = Self::get_admin(env.clone());
        if *caller != admin {
            panic_with_error!(env, MultisenderError::Unauthorized);
        }
    }
}

#[cfg(test)]
mod mock;
