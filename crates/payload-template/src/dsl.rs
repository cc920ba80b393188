//! Lexer for function calls embedded in substitution values.
//!
//! A call has the shape `{{@name}}` or `{{@name|argument}}`, with optional
//! ASCII whitespace inside the braces:
//!
//! - `{{@guid}}` - random 16 bytes as 8-4-4-4-12 hex
//! - `{{@uuid}}` - random UUID v4
//! - `{{@now}}`, `{{@now|FORMAT}}` - current time (default RFC3339)
//! - `{{@rnd}}`, `{{@rnd|N}}` - zero-padded N-digit number (default 6)
//!
//! A value holds at most one call. When several are present the first match
//! in function order wins (`guid`, `uuid`, `now`, `rnd`), leftmost within the
//! same function.
//!
//! Text that looks like a call but does not lex is not an error for the
//! evaluator; it is left as literal text. [`parse_call`] reports why.

use crate::error::DslError;
use crate::generators::numeric::{DEFAULT_DIGITS, MAX_DIGITS};
use crate::generators::timestamp::TimeFormat;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A recognized function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Guid,
    Uuid,
    Now(TimeFormat),
    Rnd(i64),
}

impl Call {
    /// Match order when a value holds several calls; lower wins.
    fn precedence(&self) -> u8 {
        match self {
            Call::Guid => 0,
            Call::Uuid => 1,
            Call::Now(_) => 2,
            Call::Rnd(_) => 3,
        }
    }
}

/// A call together with its byte span in the source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub call: Call,
    pub start: usize,
    pub end: usize,
}

/// Find the call that wins in `input`, by function order then position.
pub fn find_call(input: &str) -> Option<Token> {
    let mut best: Option<Token> = None;
    let mut from = 0;
    while let Some(offset) = input[from..].find(OPEN) {
        let start = from + offset;
        match lex_at(input, start) {
            Ok(Some(token)) => {
                let wins = match &best {
                    Some(current) => token.call.precedence() < current.call.precedence(),
                    None => true,
                };
                if wins {
                    best = Some(token);
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!("Ignoring malformed function call in {input:?}: {err}");
            }
        }
        // Braces may overlap, as in "{{{@guid}}}".
        from = start + 1;
    }
    best
}

/// Like [`find_call`], but explains the failure when no call is found.
///
/// Returns the winning call, otherwise the error from the first `{{@...`
/// sequence, otherwise [`DslError::NoToken`].
pub fn parse_call(input: &str) -> Result<Token, DslError> {
    if let Some(token) = find_call(input) {
        return Ok(token);
    }

    let mut from = 0;
    while let Some(offset) = input[from..].find(OPEN) {
        let start = from + offset;
        lex_at(input, start)?;
        from = start + 1;
    }
    Err(DslError::NoToken)
}

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

/// Lex a call whose opening braces sit at `start`.
///
/// Returns `Ok(None)` when the braces do not open a function call at all
/// (for example a `{{.placeholder}}`).
fn lex_at(input: &str, start: usize) -> Result<Option<Token>, DslError> {
    let rest = &input[start + OPEN.len()..];
    if !rest.trim_start_matches(is_space).starts_with('@') {
        return Ok(None);
    }

    let close = rest.find(CLOSE).ok_or(DslError::Unterminated(start))?;
    let end = start + OPEN.len() + close + CLOSE.len();

    let body = rest[..close].trim_matches(is_space);
    // The '@' is guaranteed by the check above.
    let body = &body[1..];

    let (name, argument) = match body.split_once('|') {
        Some((name, argument)) => (name.trim_end_matches(is_space), Some(argument.trim_matches(is_space))),
        None => (body, None),
    };

    if name.is_empty() {
        return Err(DslError::EmptyName);
    }
    if let Some(found) = name.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(DslError::UnexpectedChar { found });
    }

    // An empty argument after '|' selects the default, as with no pipe at all.
    let argument = argument.filter(|arg| !arg.is_empty());

    let call = match (name, argument) {
        ("guid", None) => Call::Guid,
        ("uuid", None) => Call::Uuid,
        ("guid" | "uuid", Some(_)) => return Err(DslError::UnexpectedArgument(name.to_string())),
        ("now", None) => Call::Now(TimeFormat::Rfc3339),
        ("now", Some(format)) => Call::Now(TimeFormat::parse(format)),
        ("rnd", None) => Call::Rnd(DEFAULT_DIGITS),
        ("rnd", Some(digits)) => Call::Rnd(parse_digits(digits)?),
        _ => return Err(DslError::UnknownFunction(name.to_string())),
    };

    Ok(Some(Token { call, start, end }))
}

/// Parse an `rnd` digit count. Counts too large for `i64` saturate, which
/// the generator then clamps.
fn parse_digits(digits: &str) -> Result<i64, DslError> {
    if let Ok(count) = digits.parse() {
        return Ok(count);
    }
    let (negative, magnitude) = match digits.strip_prefix('-') {
        Some(magnitude) => (true, magnitude),
        None => (false, digits.strip_prefix('+').unwrap_or(digits)),
    };
    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DslError::InvalidDigits(digits.to_string()));
    }
    Ok(if negative { 0 } else { MAX_DIGITS })
}
