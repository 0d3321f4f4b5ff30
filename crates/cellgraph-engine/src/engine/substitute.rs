//! Operand substitution.
//!
//! Before a formula is handed to the evaluator every address token is
//! replaced by the textual form of that cell's value, so `A1+A2*2` with
//! `A1 = 1` and `A2 = -3` becomes `1+(-3)*2`.

use super::address::Address;
use super::tokens::AddressToken;
use super::value::Value;

/// Replace each token span in `text` with the operand form of its value.
///
/// `tokens` must come from scanning `text` and be in text order.
pub fn substitute<F>(text: &str, tokens: &[AddressToken], mut resolve: F) -> String
where
    F: FnMut(&Address) -> Value,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in tokens {
        out.push_str(&text[last..token.span.start]);
        out.push_str(&resolve(&token.address).to_formula_operand());
        last = token.span.end;
    }
    out.push_str(&text[last..]);
    out
}
