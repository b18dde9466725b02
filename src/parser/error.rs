//! Error types for GML lexing and scope building.
//!
//! Malformed input is fatal for the file being parsed; there is no
//! recovery. The pipeline contains the failure to that one file.

use thiserror::Error;

/// Errors raised while turning GML source into a scope tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No lexical pattern matched at this byte offset.
    #[error("unrecognized input at byte {offset}")]
    Tokenize { offset: usize },

    /// The token stream ended inside a construct.
    #[error("unexpected end of input while parsing {context}")]
    UnexpectedEof { context: &'static str },

    /// A closing brace appeared with no scope left to close.
    #[error("unbalanced '}}' at byte {offset}: already at the file root")]
    UnbalancedBrace { offset: usize },
}
