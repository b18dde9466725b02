//! Build session configuration and project file conventions
//!
//! A YYC build session is described by the IDE's `build.bff` handoff file.
//! [`BuildConfig`] loads it and derives the cache and output directories;
//! [`source_path`] maps generated file names back to their `.gml` sources;
//! [`assets`] handles the auxiliary C++ files shipped with the tool.

mod assets;
mod build_bff;
mod paths;

pub use assets::{aux_override, copy_aux_files, default_aux_dir};
pub use build_bff::{BuildConfig, ConfigError, default_build_bff_path};
pub use paths::{
    GENERATED_SUFFIX, OBJECT_PREFIX, ROOM_PREFIX, SCRIPT_PREFIX, SourceKind, SourceMapping,
    is_generated_cpp, is_object_file, is_room_file, is_script_file, object_name, script_name,
    source_path,
};
