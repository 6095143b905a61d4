//! C6 — swap-instruction detection against the DEX catalog (spec §4.6,
//! ported from `services/swap_parser_service.py`).

use crate::constants::{burn_account, mintto_account};
use crate::graph::{prepare_destination_account_version, prepare_source_account_version, TransferProperties, TransferType};
use crate::instruction::types::{InstructionId, InstructionTree};
use crate::instruction::utils::{decode_discriminator, decode_instruction_data, get_discriminator};
use crate::transaction::TransactionContext;

use super::catalog::{self, InstructionMatcher, PoolAccountIndex};
use super::model::{PoolAddresses, TransferAccountAddresses};

/// Tries every matcher the catalog has for this instruction's program,
/// returning the id of the [`crate::swap::model::Swap`] recorded on `ctx` for
/// the first one that matches. Instructions for unrecognized programs, or
/// with no accounts, never match.
pub fn parse_swap(
    tree: &InstructionTree,
    instruction_id: InstructionId,
    ctx: &mut TransactionContext,
    parent_router_swap_id: Option<u32>,
) -> Option<u32> {
    let instruction = tree.get(instruction_id);
    if instruction.accounts.is_empty() {
        return None;
    }
    let program = catalog::get_program(&instruction.program_address)?;
    let accounts = &instruction.accounts;
    let data = instruction.data.as_deref();

    for matcher in program.matchers {
        if let Some(expected_len) = matcher.accounts_length {
            if accounts.len() != expected_len {
                continue;
            }
        }

        let Some(data) = data else { continue };
        let Ok(bytes) = decode_instruction_data(data) else { continue };
        let hex = hex_of(&bytes);

        if let Some(terminator) = matcher.terminator {
            if hex.chars().last() != Some(terminator) {
                continue;
            }
        }
        if let Some((byte_index, value)) = matcher.byte_value {
            if hex.chars().nth(byte_index) != Some(value) {
                continue;
            }
        }

        let expected_discriminator = matcher
            .instruction_name
            .map(|name| get_discriminator(name))
            .or_else(|| matcher.discriminator.map(str::to_string));
        if let Some(expected) = &expected_discriminator {
            let found = decode_discriminator(&bytes, expected.len().div_ceil(2));
            if &found != expected {
                continue;
            }
        }

        let Some(user_source) = accounts.get(matcher.user_source_token_account_index) else { continue };
        let Some(user_destination) = accounts.get(matcher.user_destination_token_account_index) else { continue };
        let user_addresses = TransferAccountAddresses {
            source: user_source.clone(),
            destination: user_destination.clone(),
        };

        let swap_id = if program.router {
            ctx.add_swap(
                true,
                instruction.program_address.clone(),
                program.label.to_string(),
                matcher.label.to_string(),
                user_addresses,
                PoolAddresses::None,
                parent_router_swap_id,
            )
        } else if let Some(pools) = matcher.pools {
            let pool_addresses = pools.iter().filter_map(|&i| accounts.get(i).cloned()).collect();
            ctx.add_swap(
                false,
                instruction.program_address.clone(),
                program.label.to_string(),
                matcher.label.to_string(),
                user_addresses.clone(),
                PoolAddresses::Many(pool_addresses),
                parent_router_swap_id,
            )
        } else {
            let pool_source = resolve_pool_account(ctx, matcher.pool_source_token_account_index, accounts, &user_addresses.destination);
            let pool_destination = resolve_pool_account(ctx, matcher.pool_destination_token_account_index, accounts, &user_addresses.source);
            let (Some(pool_source), Some(pool_destination)) = (pool_source, pool_destination) else {
                continue;
            };
            let id = ctx.add_swap(
                false,
                instruction.program_address.clone(),
                program.label.to_string(),
                matcher.label.to_string(),
                user_addresses.clone(),
                PoolAddresses::Pair(TransferAccountAddresses { source: pool_source, destination: pool_destination }),
                parent_router_swap_id,
            );

            if let Some(inference) = &matcher.native_sol_transfer_inference {
                let swap = ctx.get_swap(id).expect("swap was just added").clone();
                if let Some(transfer) = inference.infer(tree, instruction_id, &swap) {
                    let source = prepare_source_account_version(
                        ctx, &transfer.accounts.source, Some(transfer.amount), None, None, None, None, None, None, None,
                    );
                    let destination = prepare_destination_account_version(
                        ctx, &source, &transfer.accounts.destination, Some(transfer.amount), None, None, None, None,
                    );
                    ctx.graph.add_edge(
                        &source.get_vertex(),
                        &destination.get_vertex(),
                        TransferProperties::new(TransferType::NativeSol, instruction.program_address.clone(), transfer.amount, transfer.amount)
                            .with_swap_parent(Some(id))
                            .with_parent_router_swap(parent_router_swap_id),
                        None,
                    );
                }
            }

            id
        };

        return Some(swap_id);
    }

    None
}

fn resolve_pool_account(
    ctx: &TransactionContext,
    index: Option<PoolAccountIndex>,
    accounts: &[String],
    opposite_user_account: &str,
) -> Option<String> {
    match index? {
        PoolAccountIndex::Index(i) => accounts.get(i).cloned(),
        PoolAccountIndex::Burn => {
            let mint = ctx.account_repository.get_account(opposite_user_account)?.borrow().mint_address.clone()?;
            Some(burn_account(&mint))
        }
        PoolAccountIndex::MintTo => {
            let mint = ctx.account_repository.get_account(opposite_user_account)?.borrow().mint_address.clone()?;
            Some(mintto_account(&mint))
        }
    }
}

fn hex_of(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
