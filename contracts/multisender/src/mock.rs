//! Misbehaving collaborators used by the tests.

extern crate std;

use soroban_sdk::{contracttype, Address};

/// Renders an address as its strkey.
pub fn strkey(address: &Address) -> std::string::String {
    let strkey = address.to_string();
    let mut buf = std::vec![0u8; strkey.len() as usize];
    strkey.copy_into_slice(&mut buf);
    std::string::String::from_utf8(buf).unwrap()
}

#[derive(Clone)]
#[contracttype]
pub enum MockKey {
    Balance(Address),
    Allowance(Address, Address),
    Owner(u128),
    Operator(Address, Address),
    Rejects(Address),
    Received(u128),
    Holdings(Address),
}

pub mod eater {
    use super::MockKey;
    use soroban_sdk::{contract, contractimpl, Address, Env};

    /// Fungible token whose `transfer_from` reverts whenever the amount is a
    /// multiple of ten, after a run of storage reads. The engine only sees
    /// the revert and charges it the call's whole stipend.
    #[contract]
    pub struct GasEaterToken;

    #[contractimpl]
    impl GasEaterToken {
        pub fn mint(env: Env, to: Address, amount: i128) {
            let balance = Self::balance(env.clone(), to.clone());
            env.storage()
                .persistent()
                .set(&MockKey::Balance(to), &(balance + amount));
        }

        pub fn approve(
            env: Env,
            from: Address,
            spender: Address,
            amount: i128,
            expiration_ledger: u32,
        ) {
            from.require_auth();
            let _ = expiration_ledger;
            env.storage()
                .persistent()
                .set(&MockKey::Allowance(from, spender), &amount);
        }

        pub fn balance(env: Env, id: Address) -> i128 {
            env.storage()
                .persistent()
                .get(&MockKey::Balance(id))
                .unwrap_or(0)
        }

        pub fn transfer_from(
            env: Env,
            spender: Address,
            from: Address,
            to: Address,
            amount: i128,
        ) {
            spender.require_auth();

            if amount % 10 == 0 {
                for _ in 0..200 {
                    let _ = env
                        .storage()
                        .persistent()
                        .has(&MockKey::Balance(to.clone()));
                }
                panic!("gas eater");
            }

            let allowance_key = MockKey::Allowance(from.clone(), spender);
            let allowance: i128 = env
                .storage()
                .persistent()
                .get(&allowance_key)
                .unwrap_or(0);
            let from_balance = Self::balance(env.clone(), from.clone());
            if allowance < amount || from_balance < amount {
                panic!("insufficient allowance or balance");
            }

            env.storage()
                .persistent()
                .set(&allowance_key, &(allowance - amount));
            env.storage()
                .persistent()
                .set(&MockKey::Balance(from), &(from_balance - amount));
            Self::mint(env, to, amount);
        }
    }
}

pub mod collection {
    use super::MockKey;
    use soroban_sdk::{contract, contractimpl, Address, Bytes, Env};

    /// Non-fungible collection where selected receivers reject incoming tokens.
    #[contract]
    pub struct MockCollection;

    #[contractimpl]
    impl MockCollection {
        pub fn mint(env: Env, to: Address, token_id: u128) {
            env.storage()
                .persistent()
                .set(&MockKey::Owner(token_id), &to);
            Self::adjust_holdings(&env, to, 1);
        }

        pub fn balance(env: Env, owner: Address) -> u32 {
            env.storage()
                .persistent()
                .get(&MockKey::Holdings(owner))
                .unwrap_or(0)
        }

        pub fn owner_of(env: Env, token_id: u128) -> Address {
            env.storage()
                .persistent()
                .get(&MockKey::Owner(token_id))
                .unwrap()
        }

        pub fn set_approval_for_all(
            env: Env,
            owner: Address,
            operator: Address,
            approved: bool,
        ) {
            owner.require_auth();
            env.storage()
                .persistent()
                .set(&MockKey::Operator(owner, operator), &approved);
        }

        /// Makes every later transfer to `receiver` revert in its receive hook.
        pub fn reject_incoming(env: Env, receiver: Address) {
            env.storage()
                .persistent()
                .set(&MockKey::Rejects(receiver), &true);
        }

        pub fn received_data(env: Env, token_id: u128) -> Option<Bytes> {
            env.storage().persistent().get(&MockKey::Received(token_id))
        }

        pub fn safe_transfer_from(
            env: Env,
            spender: Address,
            from: Address,
            to: Address,
            token_id: u128,
            data: Bytes,
        ) {
            spender.require_auth();

            if Self::owner_of(env.clone(), token_id) != from {
                panic!("not the owner");
            }
            let approved: bool = env
                .storage()
                .persistent()
                .get(&MockKey::Operator(from.clone(), spender.clone()))
                .unwrap_or(false);
            if spender != from && !approved {
                panic!("not an operator");
            }

            // Ownership moves before the receive hook runs, so a rejection has
            // to be rolled back by the caller.
            env.storage()
                .persistent()
                .set(&MockKey::Owner(token_id), &to);
            Self::adjust_holdings(&env, from, -1);
            Self::adjust_holdings(&env, to.clone(), 1);
            if env.storage().persistent().has(&MockKey::Rejects(to)) {
                panic!("receiver rejected token");
            }
            env.storage()
                .persistent()
                .set(&MockKey::Received(token_id), &data);
        }
    }

    impl MockCollection {
        fn adjust_holdings(env: &Env, owner: Address, delta: i32) {
            let held = Self::balance(env.clone(), owner.clone()) as i32 + delta;
            env.storage()
                .persistent()
                .set(&MockKey::Holdings(owner), &(held as u32));
        }
    }
}
