/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Version resolution for collated spec documents.
 */

use crate::error::{ParseError, VersionError};
use crate::parser::SpecDocument;

/// Key path of the version inside a spec document
pub const VERSION_PATH: [&str; 2] = ["info", "version"];

const SEMVER_COMPONENTS: usize = 3;

/// Pad a version to three dot-separated components.
///
/// Missing components are filled with `0`. Versions that already have three
/// or more components are returned unchanged, and component contents are not
/// validated.
///
/// ```rust
/// use specsync_core::pad_version;
///
/// assert_eq!(pad_version("1.2"), "1.2.0");
/// assert_eq!(pad_version("1.2.3.4"), "1.2.3.4");
/// ```
pub fn pad_version(version: &str) -> String {
    let components = version.split('.').count();
    let mut padded = version.to_string();
    for _ in components..SEMVER_COMPONENTS {
        padded.push_str(".0");
    }
    padded
}

/// Read the raw version string from `info.version`.
///
/// # Errors
///
/// - `ParseError::MissingField` if the field is absent
/// - `ParseError::InvalidFieldType` if it is not a scalar
/// - `VersionError::Empty` if it is blank
pub fn extract_version(document: &SpecDocument) -> Result<String, crate::CoreError> {
    let field = VERSION_PATH.join(".");
    let raw = document
        .scalar_at(&VERSION_PATH)?
        .ok_or_else(|| ParseError::MissingField(field.clone()))?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VersionError::Empty(field).into());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_document, SpecFormat};
    use crate::CoreError;

    #[test]
    fn test_pad_two_components() {
        assert_eq!(pad_version("1.2"), "1.2.0");
    }

    #[test]
    fn test_pad_single_component() {
        assert_eq!(pad_version("4"), "4.0.0");
    }

    #[test]
    fn test_three_components_unchanged() {
        assert_eq!(pad_version("1.2.3"), "1.2.3");
        assert_eq!(pad_version(&pad_version("1.2.3")), "1.2.3");
    }

    #[test]
    fn test_four_components_unchanged() {
        assert_eq!(pad_version("1.2.3.4"), "1.2.3.4");
    }

    #[test]
    fn test_non_numeric_components_propagate() {
        assert_eq!(pad_version("v1.beta"), "v1.beta.0");
        assert_eq!(pad_version("1.0.0-rc1"), "1.0.0-rc1");
    }

    #[test]
    fn test_extract_version() {
        let doc = parse_document(r#"{"info": {"version": " 1.0 "}}"#, SpecFormat::Json).unwrap();
        assert_eq!(extract_version(&doc).unwrap(), "1.0");
    }

    #[test]
    fn test_extract_version_missing() {
        let doc = parse_document("info:\n  title: widgets\n", SpecFormat::Yaml).unwrap();
        match extract_version(&doc) {
            Err(CoreError::Parse(ParseError::MissingField(field))) => {
                assert_eq!(field, "info.version")
            }
            other => panic!("Expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_version_blank() {
        let doc = parse_document(r#"{"info": {"version": "  "}}"#, SpecFormat::Json).unwrap();
        assert!(matches!(
            extract_version(&doc),
            Err(CoreError::Version(VersionError::Empty(_)))
        ));
    }
}
