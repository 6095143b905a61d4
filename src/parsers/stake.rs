//! Stake Program parsers: `initialize`, `withdraw`, `split`, and
//! `authorize` (withdrawer changes only).

use crate::account::AccountType;
use crate::constants::SOL;
use crate::graph::{prepare_destination_account_version, prepare_source_account_version, TransferProperties, TransferType};
use crate::instruction::types::{InstructionId, InstructionTree, ParsedInstruction};
use crate::transaction::TransactionContext;

use super::common::{info_str, info_u64};
use super::InstructionParser;

fn is_stake(instruction: &ParsedInstruction, instruction_type: &str) -> bool {
    instruction.program_name.as_deref() == Some("stake") && instruction.instruction_type() == Some(instruction_type)
}

pub struct StakeInitializeParser;

impl InstructionParser for StakeInitializeParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_stake(instruction, "initialize")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, _swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let Some(info) = instruction.parsed_info() else { return };
        let Some(stake_account_address) = info_str(info, "stakeAccount") else { return };
        let Some(withdrawer_address) = info.get("authorized").and_then(|a| a.get("withdrawer")).and_then(|v| v.as_str()) else {
            return;
        };

        if let Some(account) = ctx.account_repository.get_account(stake_account_address) {
            account.borrow_mut().set_type(AccountType::Stake);
        }
        ctx.account_repository.update_owner_in_all_versions(stake_account_address, withdrawer_address);
    }
}

pub struct StakeWithdrawParser;

impl InstructionParser for StakeWithdrawParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_stake(instruction, "withdraw")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(stake_account_address), Some(destination_address), Some(lamports), Some(withdraw_authority)) = (
            info_str(info, "stakeAccount"),
            info_str(info, "destination"),
            info_u64(info, "lamports"),
            info_str(info, "withdrawAuthority"),
        ) else {
            return;
        };
        let lamports = lamports as i128;

        let source = prepare_source_account_version(
            ctx, stake_account_address, None, Some(lamports), None, None, None, Some(withdraw_authority), None, Some(AccountType::Stake),
        );
        let destination = prepare_destination_account_version(
            ctx, &source, destination_address, None, Some(lamports), None, None, None,
        );

        ctx.graph.add_edge(
            &source.get_vertex(),
            &destination.get_vertex(),
            TransferProperties::new(TransferType::Withdraw, program_address, lamports, lamports).with_swap_parent(swap_parent_id),
            None,
        );
    }
}

pub struct StakeSplitParser;

impl InstructionParser for StakeSplitParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_stake(instruction, "split")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(stake_account_address), Some(new_split_account_address), Some(authority), Some(lamports)) = (
            info_str(info, "stakeAccount"),
            info_str(info, "newSplitAccount"),
            info_str(info, "stakeAuthority"),
            info_u64(info, "lamports"),
        ) else {
            return;
        };
        let lamports = lamports as i128;

        let source = prepare_source_account_version(
            ctx, stake_account_address, None, Some(lamports), None, None, Some(SOL), Some(authority), None, Some(AccountType::Stake),
        );
        let destination = prepare_destination_account_version(
            ctx, &source, new_split_account_address, None, Some(lamports), Some(SOL), Some(authority), Some(AccountType::Stake),
        );

        ctx.graph.add_edge(
            &source.get_vertex(),
            &destination.get_vertex(),
            TransferProperties::new(TransferType::Split, program_address, lamports, lamports).with_swap_parent(swap_parent_id),
            None,
        );
    }
}

pub struct StakeAuthorizeParser;

impl InstructionParser for StakeAuthorizeParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_stake(instruction, "authorize")
            && instruction
                .parsed_info()
                .and_then(|info| info.get("authorityType"))
                .and_then(|v| v.as_str())
                == Some("Withdrawer")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(stake_account_address), Some(new_authority)) = (info_str(info, "stakeAccount"), info_str(info, "newAuthority")) else {
            return;
        };

        let source = prepare_source_account_version(
            ctx, stake_account_address, None, None, None, None, None, None, None, Some(AccountType::Stake),
        );
        let destination = prepare_destination_account_version(
            ctx, &source, stake_account_address, None, None, None, Some(new_authority), None,
        );

        let balance = source.balance_lamport;
        ctx.graph.add_edge(
            &source.get_vertex(),
            &destination.get_vertex(),
            TransferProperties::new(TransferType::Authorize, program_address, balance, balance).with_swap_parent(swap_parent_id),
            None,
        );
    }
}
