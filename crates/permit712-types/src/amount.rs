//! Human-readable token amount parsing.
//!
//! Token values on chain are integers in the token's smallest unit. People
//! write them with a decimal point instead: `"42"` of an 18-decimals token is
//! `42 * 10^18` units. [`TokenAmount`] parses the human form and scales it by
//! the token decimals.
//!
//! # Supported Formats
//!
//! - Plain numbers: `"100"`, `"0.01"`
//! - With thousand separators: `"1,000"`, `"1,000,000.50"`
//!
//! # Example
//!
//! ```rust
//! use alloy_primitives::U256;
//! use permit712_types::amount::TokenAmount;
//!
//! let amount = TokenAmount::parse("42").unwrap();
//! assert_eq!(amount.to_units(18).unwrap(), U256::from(42u64) * U256::from(10u64).pow(U256::from(18u64)));
//! ```

use alloy_primitives::U256;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("valid regex"));

static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid regex"));

/// A parsed non-negative decimal amount, not yet bound to a token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAmount(Decimal);

/// Errors that can occur when parsing or scaling a token amount.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AmountParseError {
    /// The input string could not be parsed as a number.
    #[error("Invalid number format")]
    InvalidFormat,
    /// Negative values are not allowed.
    #[error("Negative value is not allowed")]
    Negative,
    /// The input has more decimal places than the token supports.
    #[error("Too big of a precision: {amount} vs {token} on token")]
    WrongPrecision {
        /// Decimal places in the input.
        amount: u32,
        /// Decimal places supported by the token.
        token: u32,
    },
    /// The scaled value does not fit into 256 bits.
    #[error("Amount does not fit into uint256")]
    Overflow,
}

impl TokenAmount {
    /// Parses a human-readable amount.
    ///
    /// Thousand separators and whitespace are stripped before parsing and
    /// trailing zeros after the decimal point are ignored. Anything else that
    /// is not a plain decimal (exponents, hex, units) is rejected.
    pub fn parse(input: &str) -> Result<Self, AmountParseError> {
        let cleaned = SEPARATORS.replace_all(input, "");
        if !PLAIN_DECIMAL.is_match(&cleaned) {
            return Err(AmountParseError::InvalidFormat);
        }
        let parsed = Decimal::from_str(&cleaned).map_err(|_| AmountParseError::InvalidFormat)?;
        if parsed.is_sign_negative() && !parsed.is_zero() {
            return Err(AmountParseError::Negative);
        }
        Ok(TokenAmount(parsed.normalize()))
    }

    /// Number of decimal places after normalization.
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// The value without decimal point: `"12.34"` gives `1234`.
    pub fn mantissa(&self) -> u128 {
        self.0.mantissa().unsigned_abs()
    }

    /// Scales the amount to the smallest unit of a token with `decimals` places.
    pub fn to_units(&self, decimals: u8) -> Result<U256, AmountParseError> {
        let scale = self.scale();
        let token_scale = u32::from(decimals);
        if scale > token_scale {
            return Err(AmountParseError::WrongPrecision {
                amount: scale,
                token: token_scale,
            });
        }
        let multiplier = U256::from(10u64)
            .checked_pow(U256::from(token_scale - scale))
            .ok_or(AmountParseError::Overflow)?;
        U256::from(self.mantissa())
            .checked_mul(multiplier)
            .ok_or(AmountParseError::Overflow)
    }
}

impl FromStr for TokenAmount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenAmount::parse(s)
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses `input` and scales it by `decimals`, like ethers' `parseUnits`.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256, AmountParseError> {
    TokenAmount::parse(input)?.to_units(decimals)
}

/// Renders a raw token value with `decimals` places, trimming trailing zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    // 10^78 and above do not fit into 256 bits, so every value is a fraction.
    let (whole, fraction) = match U256::from(10u64).checked_pow(U256::from(decimals)) {
        Some(divisor) => (value / divisor, value % divisor),
        None => (U256::ZERO, value),
    };
    if fraction.is_zero() {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
