//! Account/version bookkeeping for one transaction (spec §4.2, ported from
//! `repositories/account_repository.py`).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::model::{Account, AccountType, AccountVersion, AccountVertex};

/// All accounts and their version history seen while building one
/// transaction's graph.
///
/// Mirrors the original's two parallel maps rather than folding them into one
/// structure — `accounts` is identity, `account_versions` is history, and
/// several callers want one without the other.
#[derive(Debug, Default)]
pub struct AccountRepository {
    accounts: HashMap<String, Rc<RefCell<Account>>>,
    account_versions: HashMap<String, Vec<AccountVersion>>,
}

impl AccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_account(&self, address: &str) -> Option<Rc<RefCell<Account>>> {
        self.accounts.get(address).cloned()
    }

    /// Creates a fresh account with its version-0 snapshot. Returns `None`
    /// without touching anything if `address` already exists.
    pub fn create_account(
        &mut self,
        address: &str,
        account_type: AccountType,
        transaction_signature: &str,
        owner: Option<String>,
        balance_token: i128,
        balance_lamport: i128,
    ) -> Option<AccountVersion> {
        if self.accounts.contains_key(address) {
            return None;
        }

        let account = Rc::new(RefCell::new(Account::new(address.to_string(), account_type)));
        self.accounts.insert(address.to_string(), account.clone());

        let version = AccountVersion {
            version: 0,
            account,
            transaction_signature: transaction_signature.to_string(),
            owner,
            balance_token,
            balance_lamport,
        };
        self.account_versions
            .insert(address.to_string(), vec![version.clone()]);
        Some(version)
    }

    pub fn get_latest_version(&self, address: &str) -> Option<AccountVersion> {
        self.account_versions.get(address)?.last().cloned()
    }

    pub fn get_version(&self, address: &str, version: u32) -> Option<AccountVersion> {
        self.account_versions
            .get(address)?
            .iter()
            .find(|v| v.version == version)
            .cloned()
    }

    pub fn get_version_by_vertex(&self, vertex: &AccountVertex) -> Option<AccountVersion> {
        self.get_version(&vertex.address, vertex.version)
    }

    /// Deep-copies the latest version of `address` into a new version one
    /// higher, sharing the same [`Account`] identity. Returns `None` if
    /// `address` has no version history yet — callers must `create_account`
    /// first (the original assumes this and indexes unconditionally; we make
    /// the precondition explicit instead of panicking).
    pub fn new_account_version(
        &mut self,
        address: &str,
        transaction_signature: &str,
    ) -> Option<AccountVersion> {
        let versions = self.account_versions.get_mut(address)?;
        let latest = versions.last()?.clone();
        let next = AccountVersion {
            version: latest.version + 1,
            account: latest.account,
            transaction_signature: transaction_signature.to_string(),
            owner: latest.owner,
            balance_token: latest.balance_token,
            balance_lamport: latest.balance_lamport,
        };
        versions.push(next.clone());
        Some(next)
    }

    /// Mutates the latest version of `address` in place via `f`, returning
    /// whether an entry existed to mutate.
    pub fn with_latest_version_mut<F>(&mut self, address: &str, f: F) -> bool
    where
        F: FnOnce(&mut AccountVersion),
    {
        match self.account_versions.get_mut(address).and_then(|v| v.last_mut()) {
            Some(version) => {
                f(version);
                true
            }
            None => false,
        }
    }

    /// If version 0 has no owner set yet, sets it on every version (the
    /// account's owner was unknown at creation and is being backfilled).
    /// Otherwise, only the latest version is updated, and only if its owner
    /// actually differs (an authority change mid-transaction).
    pub fn update_owner_in_all_versions(&mut self, address: &str, owner: &str) -> bool {
        let Some(versions) = self.account_versions.get_mut(address) else {
            return false;
        };
        let Some(first) = versions.first() else {
            return false;
        };
        if first.owner.is_none() {
            for version in versions.iter_mut() {
                version.owner = Some(owner.to_string());
            }
        } else if let Some(latest) = versions.last_mut() {
            if latest.owner.as_deref() != Some(owner) {
                latest.owner = Some(owner.to_string());
            }
        }
        true
    }

    pub fn add_authority(&mut self, address: &str, authority: &str) -> bool {
        match self.accounts.get(address) {
            Some(account) => {
                account.borrow_mut().add_authority(authority.to_string());
                true
            }
            None => false,
        }
    }

    /// Marks `address` as a liquidity-pool account, used by the swap
    /// resolver to flag every pool vertex it touches while partitioning a
    /// swap's subgraph.
    pub fn set_is_pool(&mut self, address: &str) -> bool {
        match self.accounts.get(address) {
            Some(account) => {
                account.borrow_mut().is_pool = true;
                true
            }
            None => false,
        }
    }

    pub fn update_mint_address(&mut self, address: &str, mint_address: &str) -> bool {
        match self.accounts.get(address) {
            Some(account) => {
                account.borrow_mut().set_mint_address(mint_address.to_string());
                true
            }
            None => false,
        }
    }

    pub fn get_all_accounts(&self) -> impl Iterator<Item = Rc<RefCell<Account>>> + '_ {
        self.accounts.values().cloned()
    }

    pub fn get_all_addresses(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    pub fn get_all_vertices(&self, transaction_signature: &str) -> Vec<AccountVertex> {
        self.account_versions
            .values()
            .flatten()
            .filter(|v| v.transaction_signature == transaction_signature)
            .map(AccountVersion::get_vertex)
            .collect()
    }

    pub fn get_pre_state_accounts(&self) -> Vec<AccountVersion> {
        self.account_versions
            .values()
            .filter_map(|v| v.first().cloned())
            .collect()
    }

    pub fn get_post_state_accounts(&self) -> Vec<AccountVersion> {
        self.account_versions
            .values()
            .filter_map(|v| v.last().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_account_is_idempotent() {
        let mut repo = AccountRepository::new();
        assert!(repo.create_account("addr", AccountType::Wallet, "sig", None, 0, 100).is_some());
        assert!(repo.create_account("addr", AccountType::Wallet, "sig", None, 0, 0).is_none());
    }

    #[test]
    fn new_account_version_shares_identity_and_increments() {
        let mut repo = AccountRepository::new();
        repo.create_account("addr", AccountType::Wallet, "sig", None, 0, 100);
        let v1 = repo.new_account_version("addr", "sig").unwrap();
        assert_eq!(v1.version, 1);
        assert_eq!(v1.balance_lamport, 100);

        repo.update_mint_address("addr", "mint");
        let v0 = repo.get_version("addr", 0).unwrap();
        assert_eq!(v0.account.borrow().mint_address.as_deref(), Some("mint"));
    }

    #[test]
    fn new_account_version_without_history_returns_none() {
        let mut repo = AccountRepository::new();
        assert!(repo.new_account_version("missing", "sig").is_none());
    }

    #[test]
    fn update_owner_backfills_all_versions_until_diverged() {
        let mut repo = AccountRepository::new();
        repo.create_account("addr", AccountType::Token, "sig", None, 0, 0);
        repo.new_account_version("addr", "sig");
        assert!(repo.update_owner_in_all_versions("addr", "wallet1"));
        assert_eq!(repo.get_version("addr", 0).unwrap().owner.as_deref(), Some("wallet1"));
        assert_eq!(repo.get_version("addr", 1).unwrap().owner.as_deref(), Some("wallet1"));

        repo.update_owner_in_all_versions("addr", "wallet2");
        assert_eq!(repo.get_version("addr", 0).unwrap().owner.as_deref(), Some("wallet1"));
        assert_eq!(repo.get_version("addr", 1).unwrap().owner.as_deref(), Some("wallet2"));
    }

    #[test]
    fn pre_and_post_state_reflect_first_and_last_version() {
        let mut repo = AccountRepository::new();
        repo.create_account("addr", AccountType::Wallet, "sig", None, 0, 100);
        repo.with_latest_version_mut("addr", |v| v.apply_lamport_debit(50));
        repo.new_account_version("addr", "sig");
        repo.with_latest_version_mut("addr", |v| v.apply_lamport_credit(25));

        let pre = repo.get_pre_state_accounts();
        let post = repo.get_post_state_accounts();
        assert_eq!(pre[0].balance_lamport, 50);
        assert_eq!(post[0].balance_lamport, 75);
    }
}
