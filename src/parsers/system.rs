//! System Program parsers: `transfer`, `createAccount`/`createAccountWithSeed`,
//! `assign`.

use crate::account::AccountType;
use crate::constants::STAKE_PROGRAM;
use crate::graph::{prepare_destination_account_version, prepare_source_account_version, TransferProperties, TransferType};
use crate::instruction::types::{InstructionId, InstructionTree, ParsedInstruction};
use crate::transaction::TransactionContext;

use super::common::{info_str, info_u64};
use super::InstructionParser;

fn is_system(instruction: &ParsedInstruction, instruction_type: &str) -> bool {
    instruction.program_name.as_deref() == Some("system")
        && instruction.instruction_type() == Some(instruction_type)
}

pub struct SystemTransferParser;

impl InstructionParser for SystemTransferParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_system(instruction, "transfer")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(lamports), Some(source_address), Some(destination_address)) =
            (info_u64(info, "lamports"), info_str(info, "source"), info_str(info, "destination"))
        else {
            return;
        };
        let lamports = lamports as i128;

        let owner = ctx.signer_wallets.contains(source_address).then(|| source_address.to_string());
        let authority = if owner.is_none() {
            instruction.parent.map(|parent_id| tree.get(parent_id).program_address.clone())
        } else {
            None
        };

        let source = prepare_source_account_version(
            ctx, source_address, None, Some(lamports), None, None, None, owner.as_deref(), authority.as_deref(), None,
        );
        let destination = prepare_destination_account_version(
            ctx, &source, destination_address, None, Some(lamports), None, None, None,
        );

        ctx.graph.add_edge(
            &source.get_vertex(),
            &destination.get_vertex(),
            TransferProperties::new(TransferType::Transfer, program_address, lamports, lamports).with_swap_parent(swap_parent_id),
            None,
        );
    }
}

pub struct CreateAccountParser;

impl InstructionParser for CreateAccountParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_system(instruction, "createAccount") || is_system(instruction, "createAccountWithSeed")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let program_address = instruction.program_address.clone();
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(lamports), Some(source_address), Some(new_account_address), Some(program_owner)) = (
            info_u64(info, "lamports"),
            info_str(info, "source"),
            info_str(info, "newAccount"),
            info_str(info, "owner"),
        ) else {
            return;
        };
        let lamports = lamports as i128;
        let account_type = (program_owner == STAKE_PROGRAM).then_some(AccountType::Stake);

        let source = prepare_source_account_version(
            ctx, source_address, None, Some(lamports), None, None, None, None, None, None,
        );
        let destination = prepare_destination_account_version(
            ctx, &source, new_account_address, None, Some(lamports), None, None, account_type,
        );

        ctx.graph.add_edge(
            &source.get_vertex(),
            &destination.get_vertex(),
            TransferProperties::new(TransferType::CreateAccount, program_address, lamports, lamports).with_swap_parent(swap_parent_id),
            None,
        );
    }
}

pub struct SystemAssignParser;

impl InstructionParser for SystemAssignParser {
    fn can_parse(&self, instruction: &ParsedInstruction) -> bool {
        is_system(instruction, "assign")
    }

    fn parse(&self, tree: &InstructionTree, instruction_id: InstructionId, ctx: &mut TransactionContext, _swap_parent_id: Option<u32>) {
        let instruction = tree.get(instruction_id);
        let Some(info) = instruction.parsed_info() else { return };
        let (Some(account_address), Some(program_owner)) = (info_str(info, "account"), info_str(info, "owner")) else {
            return;
        };
        if program_owner == STAKE_PROGRAM {
            if let Some(account) = ctx.account_repository.get_account(account_address) {
                account.borrow_mut().set_type(AccountType::Stake);
            }
        }
    }
}
