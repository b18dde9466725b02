//! Naming conventions of the compiler's output files.
//!
//! Each generated file's name encodes which project asset it came from:
//!
//! ```text
//! gml_GlobalScript_scr_player.gml.cpp      → scripts/scr_player/scr_player.gml
//! gml_Object_obj_door_Create_0.gml.cpp     → objects/obj_door/Create_0.gml
//! gml_Room_rm_main_rm_main.gml.cpp         → (room creation code, no source file)
//! ```
//!
//! [`source_path`] inverts that encoding to find the hand-written source a
//! generated file was compiled from.

use std::path::{Path, PathBuf};

pub const GENERATED_SUFFIX: &str = ".gml.cpp";
pub const SCRIPT_PREFIX: &str = "gml_GlobalScript_";
pub const OBJECT_PREFIX: &str = "gml_Object_";
pub const ROOM_PREFIX: &str = "gml_Room_";

/// Whether a file name is compiler output we may rewrite.
pub fn is_generated_cpp(file_name: &str) -> bool {
    file_name.ends_with(GENERATED_SUFFIX)
}

pub fn is_script_file(file_name: &str) -> bool {
    file_name.starts_with(SCRIPT_PREFIX)
}

pub fn is_object_file(file_name: &str) -> bool {
    file_name.starts_with(OBJECT_PREFIX)
}

pub fn is_room_file(file_name: &str) -> bool {
    file_name.starts_with(ROOM_PREFIX)
}

/// Which root scope a source file parses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A global script file; its root claims no symbol of its own.
    Script,
    /// An object event file; the whole file body is one event entry point.
    Object,
}

/// A generated file resolved back to its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapping {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Map a generated file name back to the `.gml` source under `project_dir`.
///
/// Returns `None` for names with no source file: rooms, `PreCreate` events
/// (synthesized by the compiler), and anything not matching a known prefix.
pub fn source_path(project_dir: &Path, file_name: &str) -> Option<SourceMapping> {
    if !is_generated_cpp(file_name) {
        return None;
    }

    if is_object_file(file_name) {
        let parts: Vec<&str> = file_name.split('_').collect();
        if parts.len() < 4 {
            return None;
        }
        let event = parts[parts.len() - 2];
        if event == "PreCreate" {
            return None;
        }
        // Last part is "<number>.gml.cpp"; the object name is everything
        // between the prefix and the event, underscores included.
        let number = parts[parts.len() - 1].strip_suffix(".cpp")?;
        let object_name = parts[2..parts.len() - 2].join("_");
        let path = project_dir
            .join("objects")
            .join(object_name)
            .join(format!("{event}_{number}"));
        return Some(SourceMapping {
            path,
            kind: SourceKind::Object,
        });
    }

    if is_script_file(file_name) {
        let name = &file_name[SCRIPT_PREFIX.len()..file_name.len() - GENERATED_SUFFIX.len()];
        let path = project_dir
            .join("scripts")
            .join(name)
            .join(format!("{name}.gml"));
        return Some(SourceMapping {
            path,
            kind: SourceKind::Script,
        });
    }

    None
}

/// Script asset name from a generated script file name.
pub fn script_name(file_name: &str) -> Option<&str> {
    if is_script_file(file_name) && is_generated_cpp(file_name) {
        Some(&file_name[SCRIPT_PREFIX.len()..file_name.len() - GENERATED_SUFFIX.len()])
    } else {
        None
    }
}

/// Object asset name from a generated event file name.
pub fn object_name(file_name: &str) -> Option<String> {
    if !is_object_file(file_name) || !is_generated_cpp(file_name) {
        return None;
    }
    let parts: Vec<&str> = file_name.split('_').collect();
    if parts.len() < 4 {
        return None;
    }
    Some(parts[2..parts.len() - 2].join("_"))
}
