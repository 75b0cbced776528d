//! Shared helpers
//!
//! - [`fs`] - Reading TOML/YAML/JSON inputs with path context, path expansion

pub mod fs;

pub use fs::{expand_path, read_json_file, read_structured_file, read_text_file};
