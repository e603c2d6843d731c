//! Pre-flight budget guard, evaluated before every transfer of a batch.

use crate::cost::required_budget;

/// Returns true when `remaining` units cannot cover `recipients_remaining`
/// more transfers at `baseline` each plus the post-loop margin.
pub fn should_abort(remaining: u64, recipients_remaining: u32, baseline: u64) -> bool {
    remaining < required_budget(recipients_remaining, baseline)
}
