//! Error types for the injection engine.
//!
//! Every variant is scoped to a single generated file. The pipeline logs
//! the failure and moves on; a bad file never aborts the batch.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;

#[derive(Debug, Error)]
pub enum InjectError {
    /// The `.gml` source the generated file maps to does not exist.
    #[error("source file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("i/o error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The scope tree claims more entry points than the compiler declared.
    /// Traversal order matching emission order is an assumption; a mismatch
    /// must surface rather than misattribute code to the wrong function.
    #[error("scope tree needs more than the {available} anonymous symbols declared in the file")]
    SymbolCountMismatch { available: usize },

    /// The generated file declares a symbol but its body is missing or has
    /// an unexpected signature.
    #[error("could not find generated body of {symbol}")]
    BodyNotFound { symbol: String },

    /// Brace scanning ran off the end of the file.
    #[error("unterminated body of {symbol}")]
    UnterminatedBody { symbol: String },
}

impl InjectError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InjectError::Io {
            path: path.into(),
            source,
        }
    }
}
