//! Auxiliary C++ assets shipped alongside the tool.
//!
//! The aux directory holds two kinds of files: support headers (such as
//! `YYCBoost.h`) copied into the compiler's output directory before the
//! first pass, and full replacements for specific generated files. A
//! replacement shares the generated file's basename and is copied over it
//! instead of running injection.

use std::io;
use std::path::{Path, PathBuf};

/// Default aux directory: `cpp/` next to the running executable. The
/// release layout ships the support headers there, mirroring the crate's
/// own `cpp/` directory.
pub fn default_aux_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("cpp"))
}

/// Copy every file in `aux_dir` into `output_dir`, overwriting existing
/// files. Returns the number of files copied. A missing aux directory
/// copies nothing.
pub fn copy_aux_files(aux_dir: &Path, output_dir: &Path) -> io::Result<usize> {
    let entries = match std::fs::read_dir(aux_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };

    let mut copied = 0;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let dest = output_dir.join(entry.file_name());
        std::fs::copy(entry.path(), &dest)?;
        tracing::debug!(file = %dest.display(), "copied aux file");
        copied += 1;
    }
    Ok(copied)
}

/// Path of the aux file overriding `file_name`, if one exists.
pub fn aux_override(aux_dir: &Path, file_name: &str) -> Option<PathBuf> {
    let candidate = aux_dir.join(file_name);
    candidate.is_file().then_some(candidate)
}
