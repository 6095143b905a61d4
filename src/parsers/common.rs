//! Small `serde_json` accessors shared by the instruction parsers — the RPC's
//! `parsed.info` shape is untyped JSON, and every parser digs the same few
//! field shapes out of it (plain numbers, numeric strings, and the
//! `multisigX: [addr, ...]` fallback some instructions use in place of a
//! single `authority`/`owner` field).

use serde_json::Value;

pub fn info_str<'a>(info: &'a Value, key: &str) -> Option<&'a str> {
    info.get(key)?.as_str()
}

pub fn info_u64(info: &Value, key: &str) -> Option<u64> {
    info.get(key)?.as_u64()
}

/// Token amounts are serialized as numeric strings (they can exceed 2^53).
pub fn info_amount(info: &Value, key: &str) -> Option<i128> {
    info.get(key)?.as_str()?.parse().ok()
}

pub fn info_nested_amount(info: &Value, outer: &str, inner: &str) -> Option<i128> {
    info.get(outer)?.get(inner)?.as_str()?.parse().ok()
}

/// Resolves an authority/owner that may be reported either as a single
/// `key` field or, for multisig accounts, as the first entry of a
/// `multisig<Suffix>` array.
pub fn info_authority<'a>(info: &'a Value, key: &str, multisig_key: &str) -> Option<&'a str> {
    info_str(info, key).or_else(|| info.get(multisig_key)?.as_array()?.first()?.as_str())
}
