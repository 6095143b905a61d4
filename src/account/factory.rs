//! Account bootstrapping from a transaction's balance snapshots (spec §4.2,
//! ported from `factories/account_factory.py`).

use std::collections::HashSet;

use crate::constants::{FEE, SOL, WRAPPED_SOL_ADDRESS};
use crate::instruction::types::TokenBalance;

use super::model::{AccountType, AccountVersion};
use super::repository::AccountRepository;

/// Creates the single process-wide virtual fee account on first use,
/// returning its current latest version on every subsequent call.
pub fn create_fee_account(repo: &mut AccountRepository, transaction_signature: &str) -> AccountVersion {
    if repo.get_account(FEE).is_some() {
        return repo
            .get_latest_version(FEE)
            .expect("fee account exists without a version history");
    }

    let version = repo
        .create_account(FEE, AccountType::Fee, transaction_signature, Some(FEE.to_string()), 0, 0)
        .expect("fee account was just confirmed absent");
    repo.update_mint_address(FEE, SOL);
    version
}

/// Seeds every account referenced by a transaction with its pre-transaction
/// balance, inferring type and mint from the token-balance snapshots first,
/// then filling in the remaining plain SOL accounts.
pub fn build_accounts_from_transaction(
    repo: &mut AccountRepository,
    pre_token_balances: &[TokenBalance],
    pre_balances: &[u64],
    account_addresses: &[String],
    signer_wallets: &HashSet<String>,
    transaction_signature: &str,
) {
    let mut mints: HashSet<String> = HashSet::new();

    for balance in pre_token_balances {
        let Some(address) = account_addresses.get(balance.account_index) else {
            continue;
        };
        if repo.get_account(address).is_some() {
            continue;
        }

        mints.insert(balance.mint.clone());
        let lamport_balance = pre_balances.get(balance.account_index).copied().unwrap_or(0) as i128;
        let token_balance: i128 = balance.amount.parse().unwrap_or(0);

        repo.create_account(
            address,
            AccountType::Token,
            transaction_signature,
            balance.owner.clone(),
            token_balance,
            lamport_balance,
        );
        repo.update_mint_address(address, &balance.mint);
    }

    for (index, address) in account_addresses.iter().enumerate() {
        if repo.get_account(address).is_some() {
            continue;
        }

        let is_signer = signer_wallets.contains(address);
        let lamport_balance = pre_balances.get(index).copied().unwrap_or(0) as i128;
        let mint_address = if address == WRAPPED_SOL_ADDRESS { WRAPPED_SOL_ADDRESS } else { SOL };
        if mint_address == WRAPPED_SOL_ADDRESS {
            mints.insert(WRAPPED_SOL_ADDRESS.to_string());
        }

        let owner = if is_signer { Some(address.clone()) } else { None };
        repo.create_account(address, AccountType::Wallet, transaction_signature, owner, 0, lamport_balance);
        repo.update_mint_address(address, mint_address);
    }

    for mint in &mints {
        if let Some(account) = repo.get_account(mint) {
            account.borrow_mut().set_type(AccountType::TokenMint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_account_creation_is_idempotent() {
        let mut repo = AccountRepository::new();
        let v1 = create_fee_account(&mut repo, "sig1");
        let v2 = create_fee_account(&mut repo, "sig2");
        assert_eq!(v1.version, v2.version);
        assert_eq!(v1.account.borrow().mint_address.as_deref(), Some(SOL));
    }

    #[test]
    fn token_balance_accounts_are_typed_and_minted() {
        let mut repo = AccountRepository::new();
        let pre_token_balances = vec![TokenBalance {
            account_index: 0,
            mint: "MINT1".into(),
            owner: Some("owner1".into()),
            amount: "500".into(),
        }];
        let addresses = vec!["tokenAcct".to_string(), "mintAccount".to_string()];
        build_accounts_from_transaction(
            &mut repo,
            &pre_token_balances,
            &[1000, 0],
            &addresses,
            &HashSet::new(),
            "sig",
        );

        let token_version = repo.get_version("tokenAcct", 0).unwrap();
        assert_eq!(token_version.balance_token, 500);
        assert_eq!(token_version.account.borrow().mint_address.as_deref(), Some("MINT1"));
    }

    #[test]
    fn remaining_addresses_become_sol_accounts() {
        let mut repo = AccountRepository::new();
        let addresses = vec!["wallet".to_string()];
        let mut signers = HashSet::new();
        signers.insert("wallet".to_string());
        build_accounts_from_transaction(&mut repo, &[], &[2_000_000], &addresses, &signers, "sig");

        let version = repo.get_version("wallet", 0).unwrap();
        assert_eq!(version.balance_lamport, 2_000_000);
        assert_eq!(version.owner.as_deref(), Some("wallet"));
        assert_eq!(version.account.borrow().mint_address.as_deref(), Some(SOL));
    }
}
