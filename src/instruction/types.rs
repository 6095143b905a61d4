//! Input shapes (spec §6) and the decoded instruction tree (spec §4.1).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// One account key from `ParsedTransaction.account_keys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountKey {
    pub pubkey: String,
    pub signer: bool,
}

/// A token balance entry from `pre_token_balances` / `post_token_balances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    pub account_index: usize,
    pub mint: String,
    pub owner: Option<String>,
    /// Integer string, e.g. `"1500000"`.
    pub amount: String,
}

/// A single raw instruction as the RPC reports it: top-level entries never carry
/// `stack_height`; inner entries always do (>= 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInstruction {
    pub program_id: String,
    pub program_name: Option<String>,
    pub accounts: Vec<String>,
    /// Structured instruction body when the RPC recognized the program.
    pub parsed: Option<Value>,
    /// Base58 raw data, present only when `parsed` is absent.
    pub data: Option<String>,
    pub stack_height: Option<u32>,
}

/// Inner instructions grouped by the index of their top-level parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InnerInstructions {
    pub index: usize,
    pub instructions: Vec<RawInstruction>,
}

/// The full external input to the core (spec §6 `ParsedTransaction`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedTransactionInput {
    pub slot: u64,
    pub block_time: Option<i64>,
    pub signature: String,
    pub err: Option<String>,
    pub fee: u64,
    pub compute_units_consumed: u64,
    pub account_keys: Vec<AccountKey>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub pre_token_balances: Vec<TokenBalance>,
    pub post_token_balances: Vec<TokenBalance>,
    pub instructions: Vec<RawInstruction>,
    pub inner_instructions: Vec<InnerInstructions>,
}

/// A decoded, tree-shaped instruction (spec §4.1 output).
///
/// `parent` is a back-reference into the same arena (spec §9: "represent the tree
/// as a flat arena indexed by integer ids"); there is no reference-counted cycle.
#[derive(Debug, Clone)]
pub struct ParsedInstruction {
    pub program_address: String,
    pub program_name: Option<String>,
    pub accounts: Vec<String>,
    pub parsed: Option<Value>,
    pub data: Option<String>,
    pub stack_height: u32,
    pub parent: Option<InstructionId>,
    pub children: Vec<InstructionId>,
}

impl ParsedInstruction {
    pub fn instruction_type(&self) -> Option<&str> {
        self.parsed
            .as_ref()
            .and_then(|v| v.get("type"))
            .and_then(|v| v.as_str())
    }

    pub fn parsed_info(&self) -> Option<&Value> {
        self.parsed.as_ref().and_then(|v| v.get("info"))
    }
}

/// Index into [`InstructionTree`]'s arena.
pub type InstructionId = usize;

/// Arena of decoded instructions for one transaction, addressable by
/// [`InstructionId`]. Top-level instructions are listed in `roots`, in source
/// order.
#[derive(Debug, Clone, Default)]
pub struct InstructionTree {
    pub nodes: Vec<ParsedInstruction>,
    pub roots: Vec<InstructionId>,
}

impl InstructionTree {
    pub fn get(&self, id: InstructionId) -> &ParsedInstruction {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: InstructionId) -> &mut ParsedInstruction {
        &mut self.nodes[id]
    }

    fn push(&mut self, node: ParsedInstruction) -> InstructionId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

/// Unused in the tree itself; kept only so `ParsedInstruction` can be cheaply
/// shared with the swap catalog's inference pass without re-decoding.
pub type SharedTransaction = Rc<ParsedTransactionInput>;

pub(crate) fn build_node(raw: &RawInstruction, stack_height: u32, parent: Option<InstructionId>) -> ParsedInstruction {
    ParsedInstruction {
        program_address: raw.program_id.clone(),
        program_name: raw.program_name.clone(),
        accounts: raw.accounts.clone(),
        parsed: raw.parsed.clone(),
        data: raw.data.clone(),
        stack_height,
        parent,
        children: Vec::new(),
    }
}

pub(crate) fn push_child(tree: &mut InstructionTree, node: ParsedInstruction) -> InstructionId {
    let parent = node.parent;
    let id = tree.push(node);
    if let Some(parent_id) = parent {
        tree.get_mut(parent_id).children.push(id);
    } else {
        tree.roots.push(id);
    }
    id
}
