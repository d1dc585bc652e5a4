//! Deterministic token file naming.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Lowercase hex SHA-256 of the principal (empty string when absent).
pub fn principal_digest(principal: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(principal.unwrap_or_default().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// `<dir>/.<prefix>_<digest>.accesstoken`
pub fn token_file_path(dir: &Path, prefix: &str, principal: Option<&str>) -> PathBuf {
    dir.join(format!(".{}_{}.accesstoken", prefix, principal_digest(principal)))
}
