//! Account identity and versioned snapshots (spec §4.2, ported from
//! `models/account.py`).

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use tracing::warn;

/// Classification of an account, refined as parsers learn more about it.
///
/// Accounts start `Unknown` and get retyped in place as instructions reveal
/// their role — a token account on its first `transfer`, a stake account on
/// `initialize`, and so on. The original mutates a shared dict entry directly
/// on every retype; [`Account::set_type`] mirrors that (last write wins, no
/// ordering is enforced beyond what the parsers themselves do).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AccountType {
    Burn,
    MintTo,
    TokenMint,
    Stake,
    Token,
    Wallet,
    Fee,
    Program,
    Unknown,
}

impl Default for AccountType {
    fn default() -> Self {
        AccountType::Unknown
    }
}

/// Shared identity for one address across every version it ever takes.
///
/// Every [`AccountVersion`] for this address holds an `Rc` to the same
/// `Account`, so retyping it (e.g. discovering its mint) is visible from all
/// versions at once — there is exactly one `Account` per address, never one
/// per version.
#[derive(Debug, Clone, Default)]
pub struct Account {
    pub address: String,
    pub account_type: AccountType,
    pub mint_address: Option<String>,
    pub is_pool: bool,
    /// Insertion-ordered, de-duplicated authorities seen for this account.
    authorities: Vec<String>,
}

impl Account {
    pub fn new(address: String, account_type: AccountType) -> Self {
        Account {
            address,
            account_type,
            mint_address: None,
            is_pool: false,
            authorities: Vec::new(),
        }
    }

    pub fn set_type(&mut self, account_type: AccountType) {
        self.account_type = account_type;
    }

    pub fn set_mint_address(&mut self, mint_address: String) {
        self.mint_address = Some(mint_address);
    }

    pub fn add_authority(&mut self, authority: String) {
        if !self.authorities.contains(&authority) {
            self.authorities.push(authority);
        }
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    pub fn is_token_account(&self) -> bool {
        matches!(self.account_type, AccountType::Token)
    }

    pub fn is_wallet_account(&self) -> bool {
        matches!(self.account_type, AccountType::Wallet)
    }

    pub fn is_system_account(&self) -> bool {
        matches!(
            self.account_type,
            AccountType::Burn | AccountType::MintTo | AccountType::Fee
        )
    }
}

/// Graph-node identity: an account at a specific version, within one
/// transaction. Used as the node key of [`crate::graph::TransactionGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AccountVertex {
    pub address: String,
    pub version: u32,
    pub transaction_signature: String,
}

/// One versioned snapshot of an account's balances within a transaction.
///
/// `account` is shared with every other version of the same address
/// (see [`Account`]); cloning an `AccountVersion` clones the `Rc` pointer, not
/// the underlying `Account` — this is how `new_account_version` "deep copies
/// the version but keeps the identity".
#[derive(Debug, Clone)]
pub struct AccountVersion {
    pub version: u32,
    pub account: Rc<RefCell<Account>>,
    pub transaction_signature: String,
    pub owner: Option<String>,
    pub balance_token: i128,
    pub balance_lamport: i128,
}

impl AccountVersion {
    pub fn get_vertex(&self) -> AccountVertex {
        AccountVertex {
            address: self.account.borrow().address.clone(),
            version: self.version,
            transaction_signature: self.transaction_signature.clone(),
        }
    }

    pub fn address(&self) -> String {
        self.account.borrow().address.clone()
    }

    /// Debits `amount` tokens. Clamps to zero and logs rather than going
    /// negative — a deliberate Rust-side hardening over the original's plain
    /// (unclamped) arithmetic, recorded in DESIGN.md.
    pub fn apply_token_debit(&mut self, amount: i128) {
        self.balance_token = self.checked_sub_clamped(self.balance_token, amount, "token");
    }

    pub fn apply_token_credit(&mut self, amount: i128) {
        self.balance_token += amount;
    }

    pub fn apply_lamport_debit(&mut self, amount: i128) {
        self.balance_lamport = self.checked_sub_clamped(self.balance_lamport, amount, "lamport");
    }

    pub fn apply_lamport_credit(&mut self, amount: i128) {
        self.balance_lamport += amount;
    }

    fn checked_sub_clamped(&self, balance: i128, amount: i128, unit: &str) -> i128 {
        let result = balance - amount;
        if result < 0 {
            warn!(
                address = %self.account.borrow().address,
                version = self.version,
                unit,
                balance,
                amount,
                "account version balance underflowed, clamping to zero"
            );
            0
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_account(address: &str) -> Rc<RefCell<Account>> {
        Rc::new(RefCell::new(Account::new(address.to_string(), AccountType::Unknown)))
    }

    #[test]
    fn cloned_versions_share_account_identity() {
        let account = make_account("addr");
        let v1 = AccountVersion {
            version: 0,
            account: account.clone(),
            transaction_signature: "sig".into(),
            owner: None,
            balance_token: 0,
            balance_lamport: 0,
        };
        let v2 = v1.clone();
        v2.account.borrow_mut().set_mint_address("mint".into());
        assert_eq!(v1.account.borrow().mint_address.as_deref(), Some("mint"));
    }

    #[test]
    fn authorities_are_deduped_in_insertion_order() {
        let mut account = Account::new("addr".into(), AccountType::Unknown);
        account.add_authority("a".into());
        account.add_authority("b".into());
        account.add_authority("a".into());
        assert_eq!(account.authorities(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn debit_past_zero_clamps_instead_of_going_negative() {
        let account = make_account("addr");
        let mut v = AccountVersion {
            version: 0,
            account,
            transaction_signature: "sig".into(),
            owner: None,
            balance_token: 5,
            balance_lamport: 0,
        };
        v.apply_token_debit(10);
        assert_eq!(v.balance_token, 0);
    }
}
