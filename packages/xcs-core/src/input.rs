//! State-string parsing.
//!
//! The engine accepts two encodings, auto-detected by inspecting the string:
//! a binary state is a run of `'0'`/`'1'` characters, one input line each;
//! anything else is treated as `';'`-separated real-valued tokens.

use crate::error::InvalidInput;

/// Transform a state string into the numeric input vector the matching and
/// update operations work on.
///
/// # Errors
///
/// [`InvalidInput::EmptyState`] for the empty string,
/// [`InvalidInput::MalformedToken`] when a real-valued token does not parse.
pub fn parse_state(state: &str) -> Result<Vec<f64>, InvalidInput> {
    if state.is_empty() {
        return Err(InvalidInput::EmptyState);
    }
    if state.bytes().all(|b| b == b'0' || b == b'1') {
        return Ok(state.bytes().map(|b| f64::from(b - b'0')).collect());
    }
    state
        .split(';')
        .map(|token| {
            token.trim().parse().map_err(|_| InvalidInput::MalformedToken {
                token: token.to_owned(),
            })
        })
        .collect()
}
