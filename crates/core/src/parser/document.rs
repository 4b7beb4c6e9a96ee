/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Parsed spec documents with scalar lookup by key path.
 */

use crate::parser::error::ParseError;
use crate::parser::SpecFormat;
use serde_json::Value;
use yaml_rust::{Yaml, YamlLoader};

/// A parsed spec document.
///
/// YAML is kept as `yaml_rust::Yaml` instead of being converted to JSON so
/// that scalars keep the exact text they were written with.
#[derive(Debug, Clone)]
pub enum SpecDocument {
    Json(Value),
    Yaml(Yaml),
}

/// Parse spec document content in the given format.
///
/// # Errors
///
/// Returns `ParseError::InvalidJson` / `ParseError::InvalidYaml` if the
/// content does not parse, or if a YAML stream contains no document.
pub fn parse_document(content: &str, format: SpecFormat) -> Result<SpecDocument, ParseError> {
    match format {
        SpecFormat::Json => serde_json::from_str(content)
            .map(SpecDocument::Json)
            .map_err(|e| ParseError::InvalidJson(format!("JSON parse error: {e}"))),
        SpecFormat::Yaml => {
            let mut docs = YamlLoader::load_from_str(content)
                .map_err(|e| ParseError::InvalidYaml(format!("YAML parse error: {e}")))?;
            if docs.is_empty() {
                return Err(ParseError::InvalidYaml("YAML document is empty".to_string()));
            }
            Ok(SpecDocument::Yaml(docs.swap_remove(0)))
        }
    }
}

impl SpecDocument {
    /// Look up a scalar by key path and return its textual form.
    ///
    /// Returns `Ok(None)` when any segment is absent or the value is null.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFieldType` when the value (or an
    /// intermediate segment) exists but is not of the expected shape.
    pub fn scalar_at(&self, path: &[&str]) -> Result<Option<String>, ParseError> {
        match self {
            SpecDocument::Json(value) => json_scalar_at(value, path),
            SpecDocument::Yaml(yaml) => yaml_scalar_at(yaml, path),
        }
    }
}

fn json_scalar_at(root: &Value, path: &[&str]) -> Result<Option<String>, ParseError> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        match current {
            Value::Object(map) => match map.get(*key) {
                Some(next) => current = next,
                None => return Ok(None),
            },
            Value::Null => return Ok(None),
            _ => {
                return Err(ParseError::InvalidFieldType(format!(
                    "{} is not an object",
                    describe(path, depth)
                )))
            }
        }
    }

    match current {
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Null => Ok(None),
        _ => Err(ParseError::InvalidFieldType(format!(
            "{} must be a string or number",
            path.join(".")
        ))),
    }
}

fn yaml_scalar_at(root: &Yaml, path: &[&str]) -> Result<Option<String>, ParseError> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        match current {
            Yaml::Hash(hash) => match hash.get(&Yaml::String((*key).to_string())) {
                Some(next) => current = next,
                None => return Ok(None),
            },
            Yaml::Null => return Ok(None),
            _ => {
                return Err(ParseError::InvalidFieldType(format!(
                    "{} is not a mapping",
                    describe(path, depth)
                )))
            }
        }
    }

    match current {
        Yaml::String(s) | Yaml::Real(s) => Ok(Some(s.clone())),
        Yaml::Integer(i) => Ok(Some(i.to_string())),
        Yaml::Null | Yaml::BadValue => Ok(None),
        _ => Err(ParseError::InvalidFieldType(format!(
            "{} must be a string or number",
            path.join(".")
        ))),
    }
}

fn describe(path: &[&str], depth: usize) -> String {
    if depth == 0 {
        "document root".to_string()
    } else {
        path[..depth].join(".")
    }
}
