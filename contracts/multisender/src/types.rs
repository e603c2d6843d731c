use soroban_sdk::{contracttype, symbol_short, Address, Bytes, Env};

/// The three kinds of asset the engine can disburse.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum AssetKind {
    Native,
    Fungible,
    NonFungible,
}

/// One non-fungible payload: the token to hand over and the data forwarded
/// to the collection's receive path.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct NftTransfer {
    pub token_id: u128,
    pub data: Bytes,
}

/// Summary of a committed batch.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct BatchReceipt {
    /// Sequential id of the batch on this engine instance
    pub batch_id: u64,
    pub kind: AssetKind,
    /// Length of the recipient list, including entries before `start_offset`
    pub recipients: u32,
    pub start_offset: u32,
    /// Number of transfers performed by this call
    pub disbursed: u32,
    /// Sum of disbursed amounts, or the number of tokens for non-fungible batches
    pub volume: i128,
    /// Units drawn from the batch budget
    pub budget_used: u64,
}

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Admin,
    NativeToken,
    BatchBudget,
    TotalBatches,
    TotalDisbursed,
}

pub struct DisburseEvents;

impl DisburseEvents {
    pub fn batch_started(
        env: &Env,
        caller: &Address,
        kind: AssetKind,
        recipients: u32,
        start_offset: u32,
    ) {
        let topics = (symbol_short!("batch"), symbol_short!("started"), caller.clone());
        env.events().publish(topics, (kind, recipients, start_offset));
    }

    pub fn batch_committed(env: &Env, receipt: &BatchReceipt) {
        let topics = (
            symbol_short!("batch"),
            symbol_short!("committed"),
            receipt.batch_id,
        );
        env.events().publish(
            topics,
            (receipt.kind, receipt.disbursed, receipt.volume, receipt.budget_used),
        );
    }
}
