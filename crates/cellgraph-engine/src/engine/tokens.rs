//! Address extraction from formula text.
//!
//! Finds every cell reference (e.g. `A1`, `bc12`) a formula mentions. The
//! result drives both the reference graph (which cells a formula depends on)
//! and operand substitution (where to splice evaluated values back in).
//!
//! Handles:
//! - Case-insensitive references, normalized to upper case
//! - Word boundaries, so `A1B2` or `X_A1` are not references
//! - References inside double-quoted string literals are ignored

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::address::Address;

/// One occurrence of an address in formula text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressToken {
    /// Byte range of the token in the scanned text.
    pub span: Range<usize>,
    pub address: Address,
}

/// Turns formula text into the addresses it references.
pub trait AddressTokenizer: Send + Sync {
    /// Every address occurrence, in text order. Must not fail: text that
    /// does not look like an address contributes nothing.
    fn tokens(&self, text: &str) -> Vec<AddressToken>;

    /// Distinct addresses in order of first appearance.
    fn addresses(&self, text: &str) -> Vec<Address> {
        let mut seen = Vec::new();
        for token in self.tokens(text) {
            if !seen.contains(&token.address) {
                seen.push(token.address);
            }
        }
        seen
    }
}

/// Regex-based tokenizer for A1-style references.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternTokenizer;

impl AddressTokenizer for PatternTokenizer {
    fn tokens(&self, text: &str) -> Vec<AddressToken> {
        let masked = mask_string_literals(text);
        address_token_re()
            .captures_iter(&masked)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(AddressToken {
                    span: whole.range(),
                    address: Address::from_parts(&caps[1], &caps[2]),
                })
            })
            .collect()
    }
}

fn address_token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z]+)([1-9][0-9]*)\b").expect("address token regex must compile")
    })
}

/// Blank out the inside of string literals while keeping byte offsets stable.
fn mask_string_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
                out.push('"');
                continue;
            }
            out.extend(std::iter::repeat_n(' ', ch.len_utf8()));
        } else {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
        }
    }

    out
}
