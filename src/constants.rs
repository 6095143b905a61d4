//! Sentinel addresses and well-known program ids (spec §6).

/// Native SOL pseudo-mint address, used as `mint_address` for lamport-denominated
/// accounts that aren't a real SPL mint.
pub const SOL: &str = "SOL";

/// Literal address of the single process-wide virtual fee account.
pub const FEE: &str = "FEE";

/// Wrapped-SOL mint, the one real mint address with dedicated handling (syncNative,
/// close-account rent reclamation).
pub const WRAPPED_SOL_ADDRESS: &str = "So11111111111111111111111111111111111111112";

/// Rent-exemption reserve reclaimed on token-account close and topped up on
/// syncNative; in lamports.
pub const RENT_RESERVE_LAMPORTS: u64 = 203_928;

pub const COMPUTE_BUDGET_PROGRAM: &str = "ComputeBudget111111111111111111111111111111";
pub const STAKE_PROGRAM: &str = "Stake11111111111111111111111111111111111111";

/// Program name the RPC uses for both classic SPL-Token and Token-2022.
pub const SPL_TOKEN_PROGRAM_NAME: &str = "spl-token";
pub const SYSTEM_PROGRAM_NAME: &str = "system";
pub const STAKE_PROGRAM_NAME: &str = "stake";
pub const ATA_PROGRAM_NAME: &str = "spl-associated-token-account";
pub const COMPUTE_BUDGET_PROGRAM_NAME: &str = "compute-budget";

/// Reference mints seeded with a known USD price before price-ratio propagation
/// (C10). Stable-USD variants seed at 1.0; wrapped-SOL/SOL seed at the caller's
/// spot price.
pub const STABLE_USD_MINTS: &[&str] = &[
    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", // USDC
    "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", // USDT
];

/// Every mint the price-ratio derivation (C10) seeds directly, without
/// needing a swap edge to reach it: the stable-USD mints (price 1.0) plus
/// native/wrapped SOL (price = the caller-supplied spot price).
pub fn reference_coin_price(mint: &str, sol_usd_price: f64) -> Option<f64> {
    if STABLE_USD_MINTS.contains(&mint) {
        Some(1.0)
    } else if mint == SOL || mint == WRAPPED_SOL_ADDRESS {
        Some(sol_usd_price)
    } else {
        None
    }
}

/// Virtual account address for burning `mint` tokens.
pub fn burn_account(mint: &str) -> String {
    format!("BURN_{mint}")
}

/// Virtual account address for minting `mint` tokens.
pub fn mintto_account(mint: &str) -> String {
    format!("MINTTO_{mint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_accounts_are_keyed_by_mint() {
        assert_eq!(burn_account("ABC"), "BURN_ABC");
        assert_eq!(mintto_account("ABC"), "MINTTO_ABC");
    }

    #[test]
    fn reference_coins_seed_stable_at_one_and_sol_at_spot() {
        assert_eq!(reference_coin_price(STABLE_USD_MINTS[0], 150.0), Some(1.0));
        assert_eq!(reference_coin_price(SOL, 150.0), Some(150.0));
        assert_eq!(reference_coin_price(WRAPPED_SOL_ADDRESS, 150.0), Some(150.0));
        assert_eq!(reference_coin_price("unrelated-mint", 150.0), None);
    }
}
