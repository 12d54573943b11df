//! On-chain donation ledger.
//!
//! Tracks the running total and the last donor. The web service does not
//! call it yet; its statistics are still mocked.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env,
};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    TotalDonated,
    LastDonor,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum DonationError {
    ZeroAmount = 1,
    TotalOverflow = 2,
}

#[contract]
pub struct DonationContract;

#[contractimpl]
impl DonationContract {
    /// Record a donation by `caller` to `recipient`; returns the new total.
    pub fn donate(
        env: Env,
        caller: Address,
        recipient: Address,
        amount: u32,
    ) -> Result<u32, DonationError> {
        caller.require_auth();

        if amount == 0 {
            return Err(DonationError::ZeroAmount);
        }

        let storage = env.storage().persistent();
        let total: u32 = storage.get(&DataKey::TotalDonated).unwrap_or(0);
        let total = total
            .checked_add(amount)
            .ok_or(DonationError::TotalOverflow)?;

        storage.set(&DataKey::TotalDonated, &total);
        storage.set(&DataKey::LastDonor, &caller);

        env.events()
            .publish((symbol_short!("donate"), caller, recipient), amount);

        Ok(total)
    }

    pub fn get_total_donated(env: Env) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::TotalDonated)
            .unwrap_or(0)
    }

    pub fn get_last_donor(env: Env) -> Option<Address> {
        env.storage().persistent().get(&DataKey::LastDonor)
    }
}
