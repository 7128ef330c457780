//! Operand token classification.
//!
//! The loader hands each instruction up to three raw operand tokens. These
//! helpers decide what a token denotes. Resolution order is fixed: register,
//! register-offset, hex literal, decimal literal, and anything else is a label
//! reference. All matching is case-insensitive and the empty token matches
//! nothing.

use std::sync::LazyLock;

use regex::Regex;

use crate::common::Word;

static REGISTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[txs][0-9]+$").expect("register pattern"));

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("decimal pattern"));

static HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^0x[0-9a-f]+$").expect("hex pattern"));

static REG_OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<offset>-?[0-9]+)\s*\((?P<reg>\D\w+)\)$").expect("reg-offset pattern")
});

/// Category of an operand token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    /// Absent operand.
    None,
    /// Register name (`t0`, `s3`, `pc`, ...).
    Register,
    /// `offset(register)` memory address.
    RegisterOffset,
    /// `0x`-prefixed literal.
    Hex,
    /// Unsigned decimal literal.
    Decimal,
    /// Anything else: resolved through the instruction buffer's label map.
    Label,
}

/// Returns `true` for register names, including `pc`.
pub fn is_register(tok: &str) -> bool {
    !tok.is_empty() && (REGISTER_RE.is_match(tok) || tok.eq_ignore_ascii_case("pc"))
}

/// Returns `true` for unsigned decimal literals.
pub fn is_decimal(tok: &str) -> bool {
    DECIMAL_RE.is_match(tok)
}

/// Returns `true` for `0x`-prefixed hex literals.
pub fn is_hex(tok: &str) -> bool {
    HEX_RE.is_match(tok)
}

/// Returns `true` for decimal or hex literals.
pub fn is_immediate(tok: &str) -> bool {
    is_decimal(tok) || is_hex(tok)
}

/// Returns `true` for `offset(register)` tokens such as `-4(t0)`.
pub fn is_register_offset(tok: &str) -> bool {
    REG_OFFSET_RE.is_match(tok)
}

/// Splits an `offset(register)` token into its signed offset and the
/// lowercase base register name.
pub fn parse_register_offset(tok: &str) -> Option<(Word, String)> {
    let caps = REG_OFFSET_RE.captures(tok)?;
    let offset = caps["offset"].parse::<Word>().ok()?;
    Some((offset, caps["reg"].to_ascii_lowercase()))
}

/// Classifies a token using the fixed resolution order.
pub fn classify(tok: &str) -> OperandKind {
    if tok.is_empty() {
        OperandKind::None
    } else if is_register(tok) {
        OperandKind::Register
    } else if is_register_offset(tok) {
        OperandKind::RegisterOffset
    } else if is_hex(tok) {
        OperandKind::Hex
    } else if is_decimal(tok) {
        OperandKind::Decimal
    } else {
        OperandKind::Label
    }
}

/// Parses a literal immediate: hex, or decimal with an optional sign.
///
/// A negative literal such as `-1` classifies as a label; callers that
/// resolve values try this first.
pub fn parse_immediate(tok: &str) -> Option<Word> {
    if is_hex(tok) {
        let digits = &tok[2..];
        return u64::from_str_radix(digits, 16).ok().map(|v| v as Word);
    }
    let unsigned = tok.strip_prefix('-').unwrap_or(tok);
    if is_decimal(unsigned) {
        tok.parse::<Word>().ok()
    } else {
        None
    }
}
