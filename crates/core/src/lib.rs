//! specsync Core Library
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.
//!
//! Pure building blocks for the client generation pipeline: package naming,
//! spec document parsing, version resolution and revision helpers.
//! Works only with in-memory data (no file I/O, no processes).
//!
//! # Example
//!
//! ```rust
//! use specsync_core::{resolve_version, to_package_name, SpecFormat, SuffixPolicy};
//!
//! let client_id = SuffixPolicy::Append("-client".to_string()).apply("widget-api");
//! assert_eq!(to_package_name(&client_id), "WidgetApiClient");
//!
//! let version = resolve_version(r#"{"info":{"version":"1.0"}}"#, SpecFormat::Json)?;
//! assert_eq!(version, "1.0.0");
//! # Ok::<(), specsync_core::CoreError>(())
//! ```

pub mod error;
pub mod naming;
pub mod parser;
pub mod revision;
pub mod version;

// Re-export the public API
pub use error::{CoreError, ParseError, VersionError};
pub use naming::{to_package_name, SuffixPolicy};
pub use parser::{parse_document, SpecDocument, SpecFormat};
pub use revision::{branch_name, CommitId};
pub use version::{extract_version, pad_version};

/// Parse a collated spec document and resolve its three-component version.
///
/// # Errors
///
/// Returns `CoreError::Parse` if the document is malformed or has no
/// `info.version`, and `CoreError::Version` if the version is blank.
pub fn resolve_version(content: &str, format: SpecFormat) -> Result<String, CoreError> {
    let document = parse_document(content, format)?;
    let raw = extract_version(&document)?;
    Ok(pad_version(&raw))
}
