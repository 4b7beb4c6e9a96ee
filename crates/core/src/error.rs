/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */
use thiserror::Error;

pub use crate::parser::error::ParseError;

/// Top-level error type for the core library
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Version error: {0}")]
    Version(#[from] VersionError),
}

/// Errors raised while reading the version out of a spec document
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Version field '{0}' is empty")]
    Empty(String),
}
