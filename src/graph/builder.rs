//! C4 — DAG-preserving account-version preparation (spec §4.4, ported from
//! `services/graph_builder_service.py`).
//!
//! The graph must stay a DAG even though a single address can receive and
//! then re-send the same tokens within one transaction (e.g. a router
//! forwarding through an intermediate account): whenever adding an edge would
//! close a cycle, the destination gets a fresh version instead of reusing the
//! one already in the graph.

use crate::account::{AccountType, AccountVersion};
use crate::constants::{burn_account, mintto_account, FEE};

use super::model::{TransferProperties, TransferType};
use crate::transaction::TransactionContext;

/// Finds (or creates) the account version to use as a transfer's source:
/// the latest version already present in the graph if one exists, else the
/// latest version overall (added to the graph fresh). If that version is the
/// repository's current latest, a new version is minted to carry the debit —
/// the one already in the graph keeps recording its pre-debit balance.
#[allow(clippy::too_many_arguments)]
pub fn prepare_source_account_version(
    ctx: &mut TransactionContext,
    source_address: &str,
    amount_token: Option<i128>,
    amount_lamport: Option<i128>,
    balance_token: Option<i128>,
    balance_lamport: Option<i128>,
    mint_address: Option<&str>,
    owner: Option<&str>,
    authority: Option<&str>,
    account_type: Option<AccountType>,
) -> AccountVersion {
    let repo = &mut ctx.account_repository;
    let latest = repo
        .get_latest_version(source_address)
        .expect("source account must already exist in the repository");

    let mut source_version = None;
    let mut version_num = latest.version;
    loop {
        let candidate = repo.get_version(source_address, version_num).expect("version exists");
        if ctx.graph.has_node(&candidate.get_vertex()) {
            source_version = Some(candidate);
            break;
        }
        if version_num == 0 {
            break;
        }
        version_num -= 1;
    }

    let source_version = match source_version {
        Some(v) => v,
        None => {
            ctx.graph.add_node(&latest.get_vertex());
            latest.clone()
        }
    };

    let is_latest = source_version.version == latest.version;
    let new_balance_version = if is_latest {
        repo.new_account_version(source_address, &ctx.transaction_signature)
            .expect("source account has a version history")
    } else {
        repo.get_latest_version(source_address).expect("source account exists")
    };

    if let Some(mint) = mint_address {
        source_version.account.borrow_mut().set_mint_address(mint.to_string());
    }

    let address = source_version.address();
    repo.with_latest_version_mut(&address, |v| {
        if let Some(amount) = amount_token {
            v.apply_token_debit(amount);
        }
        if let Some(amount) = amount_lamport {
            v.apply_lamport_debit(amount);
        }
        if let Some(balance) = balance_token {
            v.balance_token = balance;
        }
        if let Some(balance) = balance_lamport {
            v.balance_lamport = balance;
        }
    });
    let _ = new_balance_version;

    if let Some(owner) = owner {
        repo.update_owner_in_all_versions(source_address, owner);
    }
    if let Some(authority) = authority {
        repo.add_authority(source_address, authority);
    }
    if let Some(account_type) = account_type {
        source_version.account.borrow_mut().set_type(account_type);
    }

    source_version
}

/// Finds (or creates) the destination version for a transfer. If the
/// destination is already in the graph and already reachable *from* it would
/// imply the source is downstream of the destination, a fresh version is
/// used instead of re-crediting the existing one — this is the cycle guard
/// that keeps the graph a DAG.
#[allow(clippy::too_many_arguments)]
pub fn prepare_destination_account_version(
    ctx: &mut TransactionContext,
    account_version_source: &AccountVersion,
    destination_address: &str,
    amount_token: Option<i128>,
    amount_lamport: Option<i128>,
    mint_address: Option<&str>,
    owner: Option<&str>,
    account_type: Option<AccountType>,
) -> AccountVersion {
    let repo = &mut ctx.account_repository;
    let mut dest_version = repo.get_latest_version(destination_address);

    if dest_version.is_none() {
        let dest_mint = mint_address.map(str::to_string).or_else(|| {
            account_version_source.account.borrow().mint_address.clone()
        });
        dest_version = repo.create_account(
            destination_address,
            AccountType::Unknown,
            &ctx.transaction_signature,
            owner.map(str::to_string),
            0,
            0,
        );
        if let (Some(version), Some(mint)) = (&dest_version, dest_mint) {
            version.account.borrow_mut().set_mint_address(mint);
        }
    }
    let mut dest_version = dest_version.expect("destination account exists or was just created");

    if !ctx.graph.has_node(&dest_version.get_vertex()) {
        ctx.graph.add_node(&dest_version.get_vertex());
    } else if ctx.graph.has_node(&account_version_source.get_vertex())
        && ctx
            .graph
            .has_path(&dest_version.get_vertex(), &account_version_source.get_vertex())
    {
        dest_version = repo
            .new_account_version(destination_address, &ctx.transaction_signature)
            .expect("destination account exists");
        ctx.graph.add_node(&dest_version.get_vertex());
    }

    if let Some(mint) = mint_address {
        dest_version.account.borrow_mut().set_mint_address(mint.to_string());
    }
    if let Some(account_type) = account_type {
        dest_version.account.borrow_mut().set_type(account_type);
    }
    if let Some(owner) = owner {
        repo.update_owner_in_all_versions(destination_address, owner);
    }

    let address = dest_version.address();
    repo.with_latest_version_mut(&address, |v| {
        if let Some(amount) = amount_token {
            v.apply_token_credit(amount);
        }
        if let Some(amount) = amount_lamport {
            v.apply_lamport_credit(amount);
        }
    });
    repo.get_version(&address, dest_version.version).unwrap_or(dest_version)
}

/// Routes `amount_token` from `account_address` into the mint's virtual
/// `BURN_<mint>` sink, preserving the conservation invariant that every debit
/// has a matching credit somewhere in the graph.
pub fn burn(
    ctx: &mut TransactionContext,
    account_address: &str,
    mint_address: &str,
    authority: &str,
    amount_token: i128,
    program_address: &str,
    parent_swap_id: Option<u32>,
    parent_router_swap_id: Option<u32>,
) {
    let source = prepare_source_account_version(
        ctx,
        account_address,
        Some(amount_token),
        None,
        None,
        None,
        Some(mint_address),
        Some(authority),
        None,
        Some(AccountType::Token),
    );

    let burn_version = prepare_burn_virtual_account_version(ctx, mint_address, amount_token);

    ctx.graph.add_edge(
        &source.get_vertex(),
        &burn_version.get_vertex(),
        TransferProperties::new(TransferType::Burn, program_address, amount_token, amount_token)
            .with_swap_parent(parent_swap_id)
            .with_parent_router_swap(parent_router_swap_id),
        None,
    );
}

fn prepare_burn_virtual_account_version(ctx: &mut TransactionContext, mint_address: &str, amount: i128) -> AccountVersion {
    let address = burn_account(mint_address);
    let repo = &mut ctx.account_repository;

    let version = match repo.create_account(
        &address,
        AccountType::Burn,
        &ctx.transaction_signature,
        Some("BURNER".to_string()),
        amount,
        0,
    ) {
        Some(v) => {
            ctx.graph.add_node(&v.get_vertex());
            return v;
        }
        None => repo.get_latest_version(&address).expect("burn account exists"),
    };

    ctx.account_repository.with_latest_version_mut(&address, |v| v.apply_token_credit(amount));
    ctx.account_repository.get_latest_version(&address).unwrap_or(version)
}

/// Routes `amount_token` from the mint's virtual `MINTTO_<mint>` source to
/// `account_address`, the dual of [`burn`].
pub fn mint_to(
    ctx: &mut TransactionContext,
    account_address: &str,
    amount_token: i128,
    mint_address: &str,
    program_address: &str,
    parent_swap_id: Option<u32>,
    parent_router_swap_id: Option<u32>,
) {
    let mintto_version = prepare_mintto_virtual_account_version(ctx, mint_address, amount_token);

    let destination = prepare_destination_account_version(
        ctx,
        &mintto_version,
        account_address,
        Some(amount_token),
        None,
        Some(mint_address),
        None,
        Some(AccountType::Token),
    );

    ctx.graph.add_edge(
        &mintto_version.get_vertex(),
        &destination.get_vertex(),
        TransferProperties::new(TransferType::MintTo, program_address, amount_token, amount_token)
            .with_swap_parent(parent_swap_id)
            .with_parent_router_swap(parent_router_swap_id),
        None,
    );
}

fn prepare_mintto_virtual_account_version(ctx: &mut TransactionContext, mint_address: &str, amount: i128) -> AccountVersion {
    let address = mintto_account(mint_address);
    let repo = &mut ctx.account_repository;

    let version = match repo.create_account(&address, AccountType::MintTo, &ctx.transaction_signature, None, amount, 0) {
        Some(v) => {
            ctx.graph.add_node(&v.get_vertex());
            return v;
        }
        None => repo.get_latest_version(&address).expect("mintto account exists"),
    };

    ctx.account_repository.with_latest_version_mut(&address, |v| v.apply_token_credit(amount));
    ctx.account_repository.get_latest_version(&address).unwrap_or(version)
}

/// `priority_fee = microLamportsPerCu * computeUnitsConsumed / 1_000_000`,
/// delegated to [`crate::transaction::TransactionContext::compute_priority_fee`].
pub fn compute_priority_fee(ctx: &mut TransactionContext, micro_lamport: i128) {
    ctx.compute_priority_fee(micro_lamport);
}

/// Adds the base-fee (and, if nonzero, priority-fee) transfer from the fee
/// payer to the single process-wide virtual `FEE` account.
pub fn add_fee_transfers(ctx: &mut TransactionContext) {
    let fee_payer = ctx.fee_payer.clone();
    let fee = ctx.fee;

    let fee_payer_version = prepare_source_account_version(
        ctx, &fee_payer, None, Some(fee), None, None, None, None, None, None,
    );
    let fee_account = prepare_destination_account_version(
        ctx,
        &fee_payer_version,
        FEE,
        None,
        Some(fee),
        None,
        None,
        Some(AccountType::Fee),
    );
    ctx.graph.add_edge(
        &fee_payer_version.get_vertex(),
        &fee_account.get_vertex(),
        TransferProperties::new(TransferType::Fee, "FEE", fee, fee),
        None,
    );

    if ctx.priority_fee > 0 {
        let priority_fee = ctx.priority_fee;
        let fee_payer_version = prepare_source_account_version(
            ctx, &fee_payer, None, Some(priority_fee), None, None, None, None, None, None,
        );
        let fee_account = prepare_destination_account_version(
            ctx,
            &fee_payer_version,
            FEE,
            None,
            Some(priority_fee),
            None,
            None,
            Some(AccountType::Fee),
        );
        ctx.graph.add_edge(
            &fee_payer_version.get_vertex(),
            &fee_account.get_vertex(),
            TransferProperties::new(TransferType::PriorityFee, "FEE", priority_fee, priority_fee),
            None,
        );
    }
}

/// Mints a fresh version of a DEX program's own account, used only to anchor
/// the collapsed `SWAP` edge's source/target when a swap subgraph is
/// resolved (spec §4.7) — it is never a real transfer participant.
pub fn prepare_swap_program_account(ctx: &mut TransactionContext, program_address: &str) -> AccountVersion {
    if ctx.account_repository.get_account(program_address).is_none() {
        ctx.account_repository
            .create_account(program_address, AccountType::Program, &ctx.transaction_signature, None, 0, 0);
    }
    let version = ctx
        .account_repository
        .new_account_version(program_address, &ctx.transaction_signature)
        .expect("program account was just ensured to exist");
    version.account.borrow_mut().set_type(AccountType::Program);
    version
}
