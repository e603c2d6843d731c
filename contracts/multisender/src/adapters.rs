//! Single-recipient transfer adapters, one per asset kind.
//!
//! Each adapter goes through the `try_*` variant of its client so that a
//! rejected transfer only rolls back the callee and comes back as
//! [`TransferOutcome::Failure`] instead of unwinding the whole batch.
//!
//! A delivered transfer is metered at its calibrated cost, which depends on
//! whether the recipient already holds the asset. How much a reverted call
//! burnt cannot be observed from here, so it is charged its whole stipend.

use soroban_sdk::{contractclient, token, Address, Bytes, Env, IntoVal, TryFromVal, Val};

use crate::meter::{call_with_stipend, Meter};
use crate::types::{AssetKind, NftTransfer};

/// Collections the engine can move tokens out of.
#[contractclient(name = "NonFungibleClient")]
pub trait NonFungibleInterface {
    /// Number of tokens held by `owner`.
    fn balance(env: Env, owner: Address) -> u32;

    /// Moves `token_id` from `from` to `to`, forwarding `data` to the receiver.
    /// `spender` must be the owner or an approved operator.
    fn safe_transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        token_id: u128,
        data: Bytes,
    );
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransferOutcome {
    Success,
    Failure,
}

/// A transfer primitive the batch engine can drive.
pub trait Disburse {
    type Payload: IntoVal<Env, Val> + TryFromVal<Env, Val>;

    /// Predicted units for one recipient, guard check included.
    fn cost_baseline(&self) -> u64;

    /// Whether `recipient` already holds the asset.
    fn is_holder(&self, recipient: &Address) -> bool;

    /// Units a delivered transfer draws, guard check excluded.
    fn transfer_cost(&self, holder: bool) -> u64;

    /// Transfers `payload` to `recipient`, drawing from `meter`.
    /// Must never panic on a failure of the underlying asset.
    fn attempt<M: Meter>(
        &self,
        meter: &mut M,
        recipient: &Address,
        payload: &Self::Payload,
    ) -> TransferOutcome;
}

/// Runs one metered external call and folds every failure mode into an outcome.
fn metered<M: Meter>(
    meter: &mut M,
    kind: AssetKind,
    holder: bool,
    call: impl FnOnce() -> bool,
) -> TransferOutcome {
    let delivered = call_with_stipend(meter, kind.call_stipend(), |stipend| {
        let delivered = call();
        if delivered {
            stipend.consume(kind.call_cost(holder));
        } else {
            stipend.drain();
        }
        delivered
    });

    if delivered == Some(true) {
        TransferOutcome::Success
    } else {
        TransferOutcome::Failure
    }
}

fn holds_tokens(balance: &token::Client, recipient: &Address) -> bool {
    matches!(balance.try_balance(recipient), Ok(Ok(amount)) if amount > 0)
}

/// Pays native value out of the engine's own custody.
pub struct NativeAdapter<'a> {
    token: token::Client<'a>,
    custodian: Address,
}

impl<'a> NativeAdapter<'a> {
    pub fn new(env: &Env, native_token: &Address, custodian: &Address) -> Self {
        NativeAdapter {
            token: token::Client::new(env, native_token),
            custodian: custodian.clone(),
        }
    }
}

impl Disburse for NativeAdapter<'_> {
    type Payload = i128;

    fn cost_baseline(&self) -> u64 {
        AssetKind::Native.cost_baseline()
    }

    fn is_holder(&self, recipient: &Address) -> bool {
        holds_tokens(&self.token, recipient)
    }

    fn transfer_cost(&self, holder: bool) -> u64 {
        AssetKind::Native.call_cost(holder)
    }

    fn attempt<M: Meter>(
        &self,
        meter: &mut M,
        recipient: &Address,
        amount: &i128,
    ) -> TransferOutcome {
        let holder = self.is_holder(recipient);
        metered(meter, AssetKind::Native, holder, || {
            matches!(
                self.token.try_transfer(&self.custodian, recipient, amount),
                Ok(Ok(()))
            )
        })
    }
}

/// Moves a fungible asset from `owner` using the engine's allowance.
pub struct FungibleAdapter<'a> {
    token: token::Client<'a>,
    spender: Address,
    owner: Address,
}

impl<'a> FungibleAdapter<'a> {
    pub fn new(env: &Env, asset: &Address, spender: &Address, owner: &Address) -> Self {
        FungibleAdapter {
            token: token::Client::new(env, asset),
            spender: spender.clone(),
            owner: owner.clone(),
        }
    }
}

impl Disburse for FungibleAdapter<'_> {
    type Payload = i128;

    fn cost_baseline(&self) -> u64 {
        AssetKind::Fungible.cost_baseline()
    }

    fn is_holder(&self, recipient: &Address) -> bool {
        holds_tokens(&self.token, recipient)
    }

    fn transfer_cost(&self, holder: bool) -> u64 {
        AssetKind::Fungible.call_cost(holder)
    }

    fn attempt<M: Meter>(
        &self,
        meter: &mut M,
        recipient: &Address,
        amount: &i128,
    ) -> TransferOutcome {
        let holder = self.is_holder(recipient);
        metered(meter, AssetKind::Fungible, holder, || {
            matches!(
                self.token
                    .try_transfer_from(&self.spender, &self.owner, recipient, amount),
                Ok(Ok(()))
            )
        })
    }
}

/// Moves tokens of a collection where the engine is an approved operator.
pub struct NonFungibleAdapter<'a> {
    collection: NonFungibleClient<'a>,
    operator: Address,
    owner: Address,
}

impl<'a> NonFungibleAdapter<'a> {
    pub fn new(env: &Env, collection: &Address, operator: &Address, owner: &Address) -> Self {
        NonFungibleAdapter {
            collection: NonFungibleClient::new(env, collection),
            operator: operator.clone(),
            owner: owner.clone(),
        }
    }
}

impl Disburse for NonFungibleAdapter<'_> {
    type Payload = NftTransfer;

    fn cost_baseline(&self) -> u64 {
        AssetKind::NonFungible.cost_baseline()
    }

    fn is_holder(&self, recipient: &Address) -> bool {
        matches!(self.collection.try_balance(recipient), Ok(Ok(count)) if count > 0)
    }

    fn transfer_cost(&self, holder: bool) -> u64 {
        AssetKind::NonFungible.call_cost(holder)
    }

    fn attempt<M: Meter>(
        &self,
        meter: &mut M,
        recipient: &Address,
        payload: &NftTransfer,
    ) -> TransferOutcome {
        let holder = self.is_holder(recipient);
        metered(meter, AssetKind::NonFungible, holder, || {
            let result = self.collection.try_safe_transfer_from(
                &self.operator,
                &self.owner,
                recipient,
                &payload.token_id,
                &payload.data,
            );
            matches!(result, Ok(Ok(())))
        })
    }
}
