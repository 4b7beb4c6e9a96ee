//! Version resolution of a collated spec file

use super::collate::CollatedSpec;
use crate::error::CliResult;
use std::fs;
use tracing::{info, warn};

/// Read the collated spec and resolve its three-component version.
///
/// The value is not validated beyond padding; a non-semver result is only
/// warned about.
pub fn resolve_version_file(spec: &CollatedSpec) -> CliResult<String> {
    let content = fs::read_to_string(&spec.path)?;
    let version = specsync_core::resolve_version(&content, spec.format)?;

    if let Err(e) = semver::Version::parse(&version) {
        warn!(version = %version, error = %e, "spec version is not valid semver, using it as is");
    }
    info!(version = %version, "resolved spec version");

    Ok(version)
}
