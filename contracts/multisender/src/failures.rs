//! Recipients whose transfer did not go through during one batch.

use soroban_sdk::{Address, Bytes, Env, Vec};

/// Longest strkey an `Address` renders to.
const MAX_STRKEY_LEN: usize = 69;

/// Insertion-ordered set of failed recipients.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailureSet {
    recipients: Vec<Address>,
}

impl FailureSet {
    pub fn new(env: &Env) -> Self {
        FailureSet {
            recipients: Vec::new(env),
        }
    }

    /// Adds `recipient` unless it already failed earlier in the batch.
    pub fn record(&mut self, recipient: &Address) {
        if !self.recipients.contains(recipient) {
            self.recipients.push_back(recipient.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    pub fn len(&self) -> u32 {
        self.recipients.len()
    }

    pub fn recipients(&self) -> &Vec<Address> {
        &self.recipients
    }

    /// Every recipient's strkey followed by a comma, the last one included.
    pub fn render(&self) -> Bytes {
        let mut out = Bytes::new(self.recipients.env());
        self.render_into(&mut out);
        out
    }

    pub(crate) fn render_into(&self, out: &mut Bytes) {
        for recipient in self.recipients.iter() {
            append_strkey(out, &recipient);
            out.push_back(b',');
        }
    }
}

fn append_strkey(out: &mut Bytes, address: &Address) {
    let strkey = address.to_string();
    let len = strkey.len() as usize;
    let mut buf = [0u8; MAX_STRKEY_LEN];
    strkey.copy_into_slice(&mut buf[..len]);
    out.extend_from_slice(&buf[..len]);
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::strkey;
    use soroban_sdk::testutils::Address as _;
    use std::string::String;

    #[test]
    fn test_empty_set_renders_nothing() {
        let env = Env::default();
        let failures = FailureSet::new(&env);
        assert!(failures.is_empty());
        assert_eq!(failures.render(), Bytes::new(&env));
    }

    #[test]
    fn test_record_keeps_order_and_drops_repeats() {
        let env = Env::default();
        let first = Address::generate(&env);
        let second = Address::generate(&env);

        let mut failures = FailureSet::new(&env);
        failures.record(&second);
        failures.record(&first);
        failures.record(&second);

        assert_eq!(failures.len(), 2);
        assert_eq!(failures.recipients().get(0), Some(second.clone()));
        assert_eq!(failures.recipients().get(1), Some(first.clone()));

        let mut expected = String::new();
        expected.push_str(&strkey(&second));
        expected.push(',');
        expected.push_str(&strkey(&first));
        expected.push(',');
        assert_eq!(failures.render(), Bytes::from_slice(&env, expected.as_bytes()));
    }
}
