//! Lossless tokenizer and scope-tree parser for GML source
//!
//! This module turns a `.gml` file into the small amount of structure the
//! injection engine needs:
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind and byte offsets
//!     ↓
//! Scope builder → ScopeTree (arena of functions, blocks, typed locals,
//!                 accumulated /*cpp*/ code)
//! ```
//!
//! Tokenization is lossless: concatenating the token texts reproduces the
//! input byte for byte. The scope builder then discards everything except
//! scope structure and the two annotations that drive injection.
//!
//! [`docs`] parses structured `@tag` metadata out of `///` comments; it is
//! independent of the injection path.

mod cursor;
pub mod docs;
mod error;
mod lexer;
mod scope;

pub use cursor::{Mark, TokenCursor};
pub use error::ParseError;
pub use lexer::{Token, TokenKind, tokenize};
pub use scope::{Entity, EntityData, EntityId, ScopeKind, ScopeTree, build_scope_tree};

/// Re-export the offset type used by [`Token`]
pub use text_size::TextSize;
