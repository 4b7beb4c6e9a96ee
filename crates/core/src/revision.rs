/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Source revision identifiers and the names derived from them.
 */

use serde::Serialize;
use std::fmt;

const SHORT_LEN: usize = 8;

/// Prefix of branches created for generated client updates
pub const BRANCH_PREFIX: &str = "auto-generated-commit#";

/// A resolved commit of the spec repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitId {
    full: String,
}

impl CommitId {
    /// Parse `git rev-parse` output.
    ///
    /// Returns `None` for empty output or anything that is not a hex object id.
    pub fn parse(raw: &str) -> Option<Self> {
        let full = raw.trim();
        if full.is_empty() || !full.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self {
            full: full.to_ascii_lowercase(),
        })
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    /// First eight characters, used in messages and branch names
    pub fn short(&self) -> &str {
        let end = self.full.len().min(SHORT_LEN);
        &self.full[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

/// Deterministic branch name for a spec commit
pub fn branch_name(commit: &CommitId) -> String {
    format!("{BRANCH_PREFIX}{}", commit.short())
}
