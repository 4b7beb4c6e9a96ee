/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Parser module for collated API spec documents (JSON or YAML strings).
 * This module works only with in-memory data (no file I/O).
 */

pub mod document;
pub mod error;

use serde::Serialize;
use std::fmt;
use std::path::Path;

pub use document::{parse_document, SpecDocument};
pub use error::ParseError;

/// On-disk format of a spec document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Lookup order when locating a spec file: JSON wins over YAML.
    pub const PREFERENCE: [SpecFormat; 2] = [SpecFormat::Json, SpecFormat::Yaml];

    /// File extension without the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            SpecFormat::Json => "json",
            SpecFormat::Yaml => "yaml",
        }
    }

    /// Detect the format from a file path's extension.
    ///
    /// `.yml` is accepted as YAML; anything else returns `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SpecFormat::Json),
            "yaml" | "yml" => Some(SpecFormat::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
