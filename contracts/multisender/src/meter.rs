//! Budget accounting threaded through the engine and its adapters.

/// A monotonically draining supply of budget units.
pub trait Meter {
    fn remaining(&self) -> u64;

    /// Draws `units` from the supply. Drawing more than what is left empties it.
    fn consume(&mut self, units: u64);
}

/// Deterministic meter over a fixed number of units.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Allowance {
    initial: u64,
    remaining: u64,
    exhausted: bool,
}

impl Allowance {
    pub fn new(units: u64) -> Self {
        Allowance {
            initial: units,
            remaining: units,
            exhausted: false,
        }
    }

    pub fn used(&self) -> u64 {
        self.initial - self.remaining
    }

    /// True once a draw asked for more than was left.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Spends whatever is left and marks the allowance exhausted.
    pub fn drain(&mut self) {
        self.remaining = 0;
        self.exhausted = true;
    }
}

impl Meter for Allowance {
    fn remaining(&self) -> u64 {
        self.remaining
    }

    fn consume(&mut self, units: u64) {
        if units > self.remaining {
            self.remaining = 0;
            self.exhausted = true;
        } else {
            self.remaining -= units;
        }
    }
}

/// Runs `call` on a child allowance capped at `stipend` and charges the parent
/// for whatever the child used.
///
/// Returns `None` when the call tried to draw past its stipend; the stipend is
/// then spent in full but the parent keeps the rest of its budget.
pub fn call_with_stipend<M, T, F>(meter: &mut M, stipend: u64, call: F) -> Option<T>
where
    M: Meter,
    F: FnOnce(&mut Allowance) -> T,
{
    let mut child = Allowance::new(stipend.min(meter.remaining()));
    let out = call(&mut child);
    meter.consume(child.used());

    if child.is_exhausted() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowance_saturates() {
        let mut allowance = Allowance::new(100);
        allowance.consume(40);
        assert_eq!(allowance.remaining(), 60);
        assert_eq!(allowance.used(), 40);
        assert!(!allowance.is_exhausted());

        allowance.consume(61);
        assert_eq!(allowance.remaining(), 0);
        assert_eq!(allowance.used(), 100);
        assert!(allowance.is_exhausted());
    }

    #[test]
    fn test_stipend_charges_parent() {
        let mut meter = Allowance::new(1_000);
        let out = call_with_stipend(&mut meter, 300, |stipend| {
            stipend.consume(120);
            7
        });
        assert_eq!(out, Some(7));
        assert_eq!(meter.remaining(), 880);
    }

    #[test]
    fn test_stipend_overrun_is_contained() {
        let mut meter = Allowance::new(1_000);
        let out = call_with_stipend(&mut meter, 300, |stipend| stipend.consume(10_000));
        assert_eq!(out, None);
        assert_eq!(meter.remaining(), 700);
        assert!(!meter.is_exhausted());
    }

    #[test]
    fn test_drained_stipend_charges_all_of_it() {
        let mut meter = Allowance::new(1_000);
        let out = call_with_stipend(&mut meter, 300, |stipend| {
            stipend.consume(20);
            stipend.drain();
        });
        assert_eq!(out, None);
        assert_eq!(meter.used(), 300);
    }

    #[test]
    fn test_stipend_bounded_by_parent() {
        let mut meter = Allowance::new(50);
        let out = call_with_stipend(&mut meter, 300, |stipend| stipend.consume(60));
        assert_eq!(out, None);
        assert_eq!(meter.remaining(), 0);
    }
}
