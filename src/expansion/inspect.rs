//! Token level inspection of expanded action code

use std::str::FromStr;

use proc_macro2::{TokenStream, TokenTree};

/// Local flag an action assigns to decide whether its event stops at this state
pub const CONSUME_EVENT_FLAG: &str = "consume_event";

/// True if `ident` appears in `code` as an identifier token.
///
/// Occurrences inside string literals and comments do not count. Code that does not lex as Rust
/// falls back to a plain word scan.
pub fn references_identifier(code: &str, ident: &str) -> bool {
    match TokenStream::from_str(code) {
        Ok(tokens) => stream_has_ident(tokens, ident),
        Err(e) => {
            log::trace!("action code does not lex ({}), scanning words instead", e);
            code.split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .any(|word| word == ident)
        }
    }
}

fn stream_has_ident(tokens: TokenStream, ident: &str) -> bool {
    tokens.into_iter().any(|tree| match tree {
        TokenTree::Ident(i) => i == ident,
        TokenTree::Group(g) => stream_has_ident(g.stream(), ident),
        TokenTree::Punct(_) | TokenTree::Literal(_) => false,
    })
}
