//! SPL-Token and Associated-Token-Account parsers: `transfer`,
//! `transferChecked`, `closeAccount`, `burn`, `mintTo`, `syncNative`,
//! `create`/`createIdempotent`.

use crate::account::AccountType;
use crate::constants::{RENT_RESERVE_LAMPORTS, WRAPPED_SOL_ADDRESS};
use crate::graph::{burn, mint_to, prepare_destination_account_version, prepare_source_account_version, TransferProperties, TransferType};
use crate::instruction::types::{InstructionId, InstructionTree, ParsedInstruction};
use crate::transaction::TransactionContext;

use super::common::{info_amount, info_authority, info_nested_amount, info_str};
use super::InstructionParser;

fn is_token(instruction: &ParsedInstruction, instruction_type: &str) -> bool {
    instruction.program_name.as_deref() == Some("spl-token") && instruction.instruction_type() == Some(instruction_type)
}

pub struct TokenTransferParser;

impl InstructionParser for TokenTransferParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_token(instruction, "transfer")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(amount), Some(source_address), Some(destination_address), Some(authority)) = (
            info_amount(info, "amount"),
            info_str(info, "source"),
            info_str(info, "destination"),
            info_str(info, "authority"),
        ) else {
            return;
        };

        let source = prepare_source_account_version(
            ctx, source_address, Some(amount), None, None, None, None, Some(authority), None, Some(AccountType::Token),
        );
        let destination = prepare_destination_account_version(
            ctx, &source, destination_address, Some(amount), None, None, None, Some(AccountType::Token),
        );

        ctx.graph.add_edge(
            &source.get_vertex(),
            &destination.get_vertex(),
            TransferProperties::new(TransferType::Transfer, program_address, amount, amount).with_swap_parent(swap_parent_id),
            None,
        );
    }
}

pub struct TokenTransferCheckedParser;

impl InstructionParser for TokenTransferCheckedParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_token(instruction, "transferChecked")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(amount), Some(source_address), Some(destination_address), Some(mint_address)) = (
            info_nested_amount(info, "tokenAmount", "amount"),
            info_str(info, "source"),
            info_str(info, "destination"),
            info_str(info, "mint"),
        ) else {
            return;
        };
        // TODO: multisig transfers can have more than one authority; only the first is recorded.
        let authority = info_authority(info, "authority", "multisigAuthority");

        let source = prepare_source_account_version(
            ctx, source_address, Some(amount), None, None, None, Some(mint_address), authority, None, Some(AccountType::Token),
        );
        let destination = prepare_destination_account_version(
            ctx, &source, destination_address, Some(amount), None, Some(mint_address), None, Some(AccountType::Token),
        );

        ctx.graph.add_edge(
            &source.get_vertex(),
            &destination.get_vertex(),
            TransferProperties::new(TransferType::TransferChecked, program_address, amount, amount).with_swap_parent(swap_parent_id),
            None,
        );
    }
}

pub struct CloseAccountParser;

impl InstructionParser for CloseAccountParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_token(instruction, "closeAccount")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(account_address), Some(destination_address)) = (info_str(info, "account"), info_str(info, "destination")) else {
            return;
        };
        let owner = info_authority(info, "owner", "multisigOwner");

        // The account's already-recorded token balance (in lamports-worth of
        // rent it's about to give back) is read off the pre-existing version,
        // so no balance_token/balance_lamport override is passed here.
        let source = prepare_source_account_version(
            ctx, account_address, None, None, None, None, None, owner, None, Some(AccountType::Token),
        );
        let amount_lamport = source.balance_token + RENT_RESERVE_LAMPORTS as i128;

        let destination = prepare_destination_account_version(
            ctx, &source, destination_address, None, Some(amount_lamport), None, None, None,
        );

        ctx.graph.add_edge(
            &source.get_vertex(),
            &destination.get_vertex(),
            TransferProperties::new(TransferType::CloseAccount, program_address, amount_lamport, amount_lamport)
                .with_swap_parent(swap_parent_id),
            None,
        );
    }
}

pub struct BurnParser;

impl InstructionParser for BurnParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_token(instruction, "burn")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(amount), Some(account_address), Some(authority), Some(mint_address)) = (
            info_amount(info, "amount"),
            info_str(info, "account"),
            info_str(info, "authority"),
            info_str(info, "mint"),
        ) else {
            return;
        };

        burn(ctx, account_address, mint_address, authority, amount, &program_address, swap_parent_id, None);
    }
}

pub struct MintToParser;

impl InstructionParser for MintToParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_token(instruction, "mintTo")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(amount), Some(account_address), Some(mint_address)) =
            (info_amount(info, "amount"), info_str(info, "account"), info_str(info, "mint"))
        else {
            return;
        };

        mint_to(ctx, account_address, amount, mint_address, &program_address, swap_parent_id, None);
    }
}

/// `syncNative` tops up a token account's `balance_token` from its lamport
/// balance (minus the rent reserve) in place — it's not a transfer between
/// two accounts, so unlike every other parser here it adds no graph edge.
pub struct SyncNativeParser;

impl InstructionParser for SyncNativeParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_token(instruction, "syncNative")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, _swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let Some(info) = instruction.parsed_info() else { return };
        let Some(account_address) = info_str(info, "account") else { return };

        if let Some(account) = ctx.account_repository.get_account(account_address) {
            let mut account = account.borrow_mut();
            account.set_mint_address(WRAPPED_SOL_ADDRESS.to_string());
            account.set_type(AccountType::Token);
        }
        ctx.account_repository.with_latest_version_mut(account_address, |v| {
            v.balance_token += v.balance_lamport - RENT_RESERVE_LAMPORTS as i128;
        });
    }
}

pub struct AssociatedTokenAccountCreateParser;

impl InstructionParser for AssociatedTokenAccountCreateParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        instruction.program_name.as_deref() == Some("spl-associated-token-account")
            && matches!(instruction.instruction_type(), Some("create") | Some("createIdempotent"))
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, _swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(new_account_address), Some(mint_address), Some(wallet)) =
            (info_str(info, "account"), info_str(info, "mint"), info_str(info, "wallet"))
        else {
            return;
        };

        if let Some(account) = ctx.account_repository.get_account(new_account_address) {
            let mut account = account.borrow_mut();
            account.set_mint_address(mint_address.to_string());
            account.set_type(AccountType::Token);
        }
        ctx.account_repository.update_owner_in_all_versions(new_account_address, wallet);
    }
}
