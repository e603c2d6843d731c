//! Cost model used to predict whether a batch can finish.
//!
//! Units are abstract budget units drawn from the engine's per-batch
//! allowance. Baselines are what the guard predicts per recipient and are
//! rounded up from the metered cost of a transfer to an existing holder.
//! A recipient that does not hold the asset yet needs a new ledger entry,
//! which the baseline does not cover.

use crate::types::AssetKind;

/// Charged every time the budget guard is evaluated.
pub const GUARD_CHECK_COST: u64 = 100;

/// Reserved for the work done after the loop (statistics write and commit event).
pub const SAFETY_MARGIN: u64 = 5_000;

/// Baseline for one native transfer, guard check included.
pub const NATIVE_TRANSFER_COST: u64 = 24_000;

/// Baseline for one fungible `transfer_from`, guard check included.
pub const FUNGIBLE_TRANSFER_COST: u64 = 32_000;

/// Baseline for one non-fungible `safe_transfer_from`, guard check included.
pub const NON_FUNGIBLE_TRANSFER_COST: u64 = 60_000;

/// Metered cost of a native transfer to an existing holder.
pub const NATIVE_CALL_COST: u64 = 21_500;

/// Metered cost of a fungible `transfer_from` to an existing holder.
pub const FUNGIBLE_CALL_COST: u64 = 29_500;

/// Metered cost of a non-fungible `safe_transfer_from` to an existing holder.
pub const NON_FUNGIBLE_CALL_COST: u64 = 55_500;

/// Surcharge for a recipient that does not hold the asset yet.
pub const ENTRY_CREATION_COST: u64 = 6_000;

impl AssetKind {
    pub fn cost_baseline(&self) -> u64 {
        match self {
            AssetKind::Native => NATIVE_TRANSFER_COST,
            AssetKind::Fungible => FUNGIBLE_TRANSFER_COST,
            AssetKind::NonFungible => NON_FUNGIBLE_TRANSFER_COST,
        }
    }

    /// What one well-behaved external call is metered at.
    pub fn call_cost(&self, holder: bool) -> u64 {
        let call = match self {
            AssetKind::Native => NATIVE_CALL_COST,
            AssetKind::Fungible => FUNGIBLE_CALL_COST,
            AssetKind::NonFungible => NON_FUNGIBLE_CALL_COST,
        };
        if holder {
            call
        } else {
            call + ENTRY_CREATION_COST
        }
    }

    /// Most a single recipient's call may draw before it counts as failed.
    /// A reverted call is charged all of it.
    pub fn call_stipend(&self) -> u64 {
        self.cost_baseline() * 2
    }
}

/// What the guard asks for before paying `count` more recipients.
pub fn required_budget(count: u32, baseline: u64) -> u64 {
    (count as u64)
        .saturating_mul(baseline)
        .saturating_add(SAFETY_MARGIN)
}
