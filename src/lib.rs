//! # yyc-inject
//!
//! Core library for injecting hand-written C++ into the GameMaker YYC
//! compiler's generated output.
//!
//! GML source may carry two annotations: `/*cpp ... */` replaces the whole
//! generated body of the enclosing function or event with the embedded
//! C++, and `var x /*: type */` retypes the generated `YYRValue` local to
//! the declared native type. During a build, the pipeline maps every
//! generated `.gml.cpp` file back to its source, applies the annotations,
//! and rewrites the file in place before the C++ toolchain picks it up.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! pipeline  → Work queue, worker pool, filesystem watcher
//!   ↓
//! inject    → Anonymous-symbol claiming, body replacement, local retyping
//!   ↓
//! project   → build.bff config, output-file naming conventions, aux assets
//!   ↓
//! parser    → Logos lexer, scope-tree builder, doc-tag parser
//! ```

// ============================================================================
// MODULES (dependency order: parser → project → inject → pipeline)
// ============================================================================

/// Parser: Logos lexer, scope-tree builder, doc-tag parser
pub mod parser;

/// Project: build.bff loading, naming conventions, aux assets
pub mod project;

/// Injection engine: symbol claiming and in-place rewriting
pub mod inject;

/// Pipeline: queue, worker pool, watcher, run report
pub mod pipeline;

// Re-export the types a typical embedding needs
pub use inject::{InjectError, Injector, Outcome};
pub use parser::{ParseError, ScopeKind, ScopeTree, build_scope_tree, tokenize};
pub use pipeline::{Mode, Pipeline, PipelineOptions, Report, StopHandle};
pub use project::{BuildConfig, ConfigError, source_path};
