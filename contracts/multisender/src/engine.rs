//! Batch coordinator.
//!
//! A batch goes through three phases:
//! - validating, in [`Batch::new`]: recipient and payload lists must have the
//!   same length and the start offset must lie within them;
//! - iterating, in [`Batch::run`]: before every transfer the budget guard
//!   checks that the remaining allowance still covers the rest of the batch,
//!   and a failed transfer is recorded without stopping the loop;
//! - deciding: any recorded failure turns into [`DisburseError::PartialFailure`].
//!
//! [`estimate_budget`] replays the guard over a list of recipients without
//! transferring anything, giving the smallest allowance a well-behaved batch
//! commits with.
//!
//! Errors are returned, not raised. Discarding the effects of an aborted batch
//! is left to the caller, which does it by failing the whole invocation.

use core::fmt::{self, Write};

use soroban_sdk::{log, Address, Bytes, Env, IntoVal, Map, String, TryFromVal, Val, Vec};

use crate::adapters::{Disburse, TransferOutcome};
use crate::cost::{required_budget, GUARD_CHECK_COST, SAFETY_MARGIN};
use crate::failures::FailureSet;
use crate::guard::should_abort;
use crate::meter::Meter;
use crate::MultisenderError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DisburseError {
    LengthMismatch { recipients: u32, payloads: u32 },
    InvalidStartOffset { start_offset: u32, total: u32 },
    /// `index` is 1-based: the position a caller can resume from with
    /// `start_offset = index - 1`.
    BudgetExhausted { index: u32, total: u32 },
    PartialFailure(FailureSet),
}

impl DisburseError {
    pub fn code(&self) -> MultisenderError {
        match self {
            DisburseError::LengthMismatch { .. } => MultisenderError::LengthMismatch,
            DisburseError::InvalidStartOffset { .. } => MultisenderError::InvalidStartOffset,
            DisburseError::BudgetExhausted { .. } => MultisenderError::BudgetExhausted,
            DisburseError::PartialFailure(_) => MultisenderError::PartialFailure,
        }
    }

    /// Human readable diagnostic. Budget and partial failure texts are relied
    /// upon by existing callers and must not change.
    pub fn message(&self, env: &Env) -> Bytes {
        let mut out = Bytes::new(env);
        let mut writer = BytesWriter(&mut out);
        let _ = match self {
            DisburseError::LengthMismatch {
                recipients,
                payloads,
            } => write!(
                writer,
                "recipient and payload counts differ: {} recipients, {} payloads",
                recipients, payloads
            ),
            DisburseError::InvalidStartOffset {
                start_offset,
                total,
            } => write!(
                writer,
                "start offset {} is past the end of {} recipients",
                start_offset, total
            ),
            DisburseError::BudgetExhausted { index, total } => {
                write!(writer, "will run out of gas at index {} in {}", index, total)
            }
            DisburseError::PartialFailure(failures) => {
                let header = write!(
                    writer,
                    "failed to transfer to {} addresses: ",
                    failures.len()
                );
                failures.render_into(writer.0);
                header
            }
        };
        out
    }

    /// Writes [`Self::message`] to the diagnostic log as text, split over
    /// several entries when it is longer than [`DIAGNOSTIC_CHUNK`] bytes.
    pub fn log(&self, env: &Env) {
        let message = self.message(env);
        let mut buf = [0u8; DIAGNOSTIC_CHUNK];
        let mut start = 0;
        while start < message.len() {
            let end = message.len().min(start + DIAGNOSTIC_CHUNK as u32);
            let chunk = &mut buf[..(end - start) as usize];
            message.slice(start..end).copy_into_slice(chunk);
            log!(env, "disbursement aborted", String::from_bytes(env, chunk));
            start = end;
        }
    }
}

/// Largest piece of a diagnostic written to one log entry.
pub const DIAGNOSTIC_CHUNK: usize = 4096;

struct BytesWriter<'a>(&'a mut Bytes);

impl Write for BytesWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// A validated request: recipients, their payloads and where to start.
pub struct Batch<P> {
    recipients: Vec<Address>,
    payloads: Vec<P>,
    start_offset: u32,
}

impl<P> Batch<P>
where
    P: IntoVal<Env, Val> + TryFromVal<Env, Val>,
{
    pub fn new(
        recipients: Vec<Address>,
        payloads: Vec<P>,
        start_offset: u32,
    ) -> Result<Self, DisburseError> {
        if recipients.len() != payloads.len() {
            return Err(DisburseError::LengthMismatch {
                recipients: recipients.len(),
                payloads: payloads.len(),
            });
        }
        if start_offset > recipients.len() {
            return Err(DisburseError::InvalidStartOffset {
                start_offset,
                total: recipients.len(),
            });
        }

        Ok(Batch {
            recipients,
            payloads,
            start_offset,
        })
    }

    pub fn len(&self) -> u32 {
        self.recipients.len()
    }

    pub fn start_offset(&self) -> u32 {
        self.start_offset
    }

    /// Number of recipients this call will pay.
    pub fn pending(&self) -> u32 {
        self.len() - self.start_offset
    }

    pub fn payloads(&self) -> &Vec<P> {
        &self.payloads
    }

    /// Drives `disburser` over every recipient from the start offset on.
    ///
    /// Returns the number of transfers made. Transfers already performed are
    /// not undone on error.
    pub fn run<D, M>(&self, env: &Env, disburser: &D, meter: &mut M) -> Result<u32, DisburseError>
    where
        D: Disburse<Payload = P>,
        M: Meter,
    {
        let total = self.len();
        let baseline = disburser.cost_baseline();
        let mut failures = FailureSet::new(env);

        for i in self.start_offset..total {
            if should_abort(meter.remaining(), total - i, baseline) {
                log!(env, "budget guard tripped", i + 1, total, meter.remaining());
                return Err(DisburseError::BudgetExhausted {
                    index: i + 1,
                    total,
                });
            }
            meter.consume(GUARD_CHECK_COST);

            let recipient = self.recipients.get_unchecked(i);
            let payload = self.payloads.get_unchecked(i);
            if disburser.attempt(meter, &recipient, &payload) == TransferOutcome::Failure {
                log!(env, "transfer failed", recipient, i);
                failures.record(&recipient);
            }
        }

        if !failures.is_empty() {
            return Err(DisburseError::PartialFailure(failures));
        }
        Ok(self.pending())
    }
}

/// Smallest allowance with which every guard check of a batch over
/// `recipients[start_offset..]` passes, assuming each transfer is delivered.
///
/// A recipient met earlier in the list is priced as a holder.
pub fn estimate_budget<D: Disburse>(
    env: &Env,
    disburser: &D,
    recipients: &Vec<Address>,
    start_offset: u32,
) -> u64 {
    let total = recipients.len();
    let baseline = disburser.cost_baseline();
    let mut seen: Map<Address, bool> = Map::new(env);
    let mut spent: u64 = 0;
    let mut needed = SAFETY_MARGIN;

    for i in start_offset..total {
        needed = needed.max(spent.saturating_add(required_budget(total - i, baseline)));

        let recipient = recipients.get_unchecked(i);
        let holder = seen.contains_key(recipient.clone()) || disburser.is_holder(&recipient);
        seen.set(recipient, true);
        spent = spent
            .saturating_add(GUARD_CHECK_COST)
            .saturating_add(disburser.transfer_cost(holder));
    }

    needed.max(spent)
}
