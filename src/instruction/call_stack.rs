//! C1 — instruction call-stack decoder (spec §4.1).

use std::collections::HashMap;

use crate::error::{GraphError, Result};

use super::types::{build_node, push_child, InstructionId, InstructionTree, ParsedTransactionInput, RawInstruction};

/// Reconstructs the recursive instruction tree from a transaction's flat
/// top-level + inner-instruction lists, keyed by `stack_height`.
///
/// Top-level instructions are always height 0; inner instructions report a raw
/// `stack_height` starting at 2. An inner instruction belongs to the nearest
/// preceding instruction whose height it strictly exceeds.
pub fn get_instruction_call_stack(input: &ParsedTransactionInput) -> Result<InstructionTree> {
    let mut tree = InstructionTree::default();

    let inner_map: HashMap<usize, &Vec<RawInstruction>> = input
        .inner_instructions
        .iter()
        .map(|group| (group.index, &group.instructions))
        .collect();

    for (idx, raw) in input.instructions.iter().enumerate() {
        let node = build_node(raw, 0, None);
        let main_id = push_child(&mut tree, node);

        if let Some(inner_list) = inner_map.get(&idx) {
            build_level(&mut tree, inner_list, 0, 2, Some(main_id))?;
        }
    }

    Ok(tree)
}

/// Walks `instructions[start_idx..]`, attaching every instruction whose height
/// is `>= min_height` as a descendant of `parent`, recursing for any run of
/// instructions whose height exceeds the current one. Stops at the first
/// instruction whose height drops back below `min_height` (a sibling of an
/// ancestor).
fn build_level(
    tree: &mut InstructionTree,
    instructions: &[RawInstruction],
    start_idx: usize,
    min_height: u32,
    parent: Option<InstructionId>,
) -> Result<Vec<InstructionId>> {
    let mut result = Vec::new();
    let mut i = start_idx;

    while i < instructions.len() {
        let instruction = &instructions[i];
        let stack_height = instruction.stack_height;

        if stack_height.is_none() && min_height > 0 {
            return Err(GraphError::MalformedInstruction(format!(
                "inner instruction at index {i} has no stack_height"
            )));
        }
        if let Some(h) = stack_height {
            if h < min_height {
                break;
            }
        }
        let effective_height = stack_height.unwrap_or(0);

        // Find the run of instructions that are descendants of this one.
        let mut j = i + 1;
        while j < instructions.len() {
            match instructions[j].stack_height {
                None => break,
                Some(next_height) if next_height <= effective_height => break,
                _ => j += 1,
            }
        }

        let node = build_node(instruction, effective_height, parent);
        let id = push_child(tree, node);

        if j > i + 1 {
            build_level(tree, instructions, i + 1, effective_height + 1, Some(id))?;
        }

        result.push(id);
        i = j;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::types::{AccountKey, InnerInstructions};

    fn raw(program_id: &str, stack_height: Option<u32>) -> RawInstruction {
        RawInstruction {
            program_id: program_id.to_string(),
            program_name: None,
            accounts: vec![],
            parsed: None,
            data: None,
            stack_height,
        }
    }

    fn base_input() -> ParsedTransactionInput {
        ParsedTransactionInput {
            slot: 1,
            block_time: None,
            signature: "sig".into(),
            err: None,
            fee: 5000,
            compute_units_consumed: 0,
            account_keys: vec![AccountKey { pubkey: "A".into(), signer: true }],
            pre_balances: vec![],
            post_balances: vec![],
            pre_token_balances: vec![],
            post_token_balances: vec![],
            instructions: vec![],
            inner_instructions: vec![],
        }
    }

    #[test]
    fn flat_two_level_nesting() {
        let mut input = base_input();
        input.instructions = vec![raw("router", None)];
        input.inner_instructions = vec![InnerInstructions {
            index: 0,
            instructions: vec![raw("pool_a", Some(2)), raw("pool_b", Some(2))],
        }];

        let tree = get_instruction_call_stack(&input).unwrap();
        assert_eq!(tree.roots.len(), 1);
        let root = tree.get(tree.roots[0]);
        assert_eq!(root.stack_height, 0);
        assert_eq!(root.children.len(), 2);
        for child in &root.children {
            assert_eq!(tree.get(*child).stack_height, 2);
            assert!(tree.get(*child).children.is_empty());
        }
    }

    #[test]
    fn three_level_nesting_attaches_grandchild() {
        let mut input = base_input();
        input.instructions = vec![raw("router", None)];
        input.inner_instructions = vec![InnerInstructions {
            index: 0,
            instructions: vec![raw("child_swap", Some(2)), raw("grandchild_transfer", Some(3))],
        }];

        let tree = get_instruction_call_stack(&input).unwrap();
        let root = tree.get(tree.roots[0]);
        assert_eq!(root.children.len(), 1);
        let child = tree.get(root.children[0]);
        assert_eq!(child.stack_height, 2);
        assert_eq!(child.children.len(), 1);
        let grandchild = tree.get(child.children[0]);
        assert_eq!(grandchild.stack_height, 3);
        assert_eq!(grandchild.parent, Some(root.children[0]));
    }

    #[test]
    fn missing_stack_height_on_inner_instruction_is_malformed() {
        let mut input = base_input();
        input.instructions = vec![raw("router", None)];
        input.inner_instructions = vec![InnerInstructions {
            index: 0,
            instructions: vec![raw("pool_a", None)],
        }];

        let err = get_instruction_call_stack(&input).unwrap_err();
        assert!(matches!(err, GraphError::MalformedInstruction(_)));
    }
}
