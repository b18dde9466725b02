//! Injection engine for generated `.gml.cpp` files
//!
//! Rewrites the YYC compiler's output in place: function bodies whose GML
//! source carries `/*cpp*/` annotations are replaced with the hand-written
//! C++, and `var x /*: type */` annotations retype the generated locals.
//! A processed file starts with the include directive, which doubles as
//! the idempotency marker; the compiler never emits that line itself.

use std::io::{self, BufRead, BufReader};
use std::path::Path;

mod engine;
mod error;
mod patterns;
mod rewrite;

pub use engine::{Injector, Outcome, inject_file};
pub use error::InjectError;
pub use patterns::{anonymous_symbols, locate_body};
pub use rewrite::TypedLocalRewriter;

/// Line prepended to every processed file.
pub const INCLUDE_DIRECTIVE: &str = "#include \"YYCBoost.h\"\n";

/// Whether the first line of `path` is the include directive. A missing
/// file reads as unmarked; racing the compiler's own writes is expected.
pub fn has_include_marker(path: &Path) -> io::Result<bool> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line)?;
    Ok(first_line == INCLUDE_DIRECTIVE)
}
