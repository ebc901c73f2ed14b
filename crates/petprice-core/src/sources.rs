//! Retail source registry and the trust policy derived from it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Trusted sources used when no registry file is available, highest rank first.
pub const DEFAULT_TRUSTED_SOURCES: &[&str] = &["Petz", "Amazon", "Petlove", "Cobasi", "Magalu"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default)]
    pub trusted: bool,
    /// Display order among trusted sources (1 = most preferred).
    pub rank: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

impl SourcesFile {
    /// Builds the trust policy from the trusted entries, ordered by rank.
    #[must_use]
    pub fn trust_policy(&self) -> TrustPolicy {
        let mut trusted: Vec<&SourceConfig> = self.sources.iter().filter(|s| s.trusted).collect();
        trusted.sort_by_key(|s| s.rank.unwrap_or(u8::MAX));
        TrustPolicy::new(trusted.into_iter().map(|s| s.name.clone()).collect())
    }
}

/// Load and validate the source registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_ranks = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        if !source.trusted {
            continue;
        }
        if let Some(rank) = source.rank {
            if !seen_ranks.insert(rank) {
                return Err(ConfigError::Validation(format!(
                    "source '{}' reuses trusted rank {rank}",
                    source.name
                )));
            }
        }
    }

    Ok(())
}

/// Ranked list of trusted source names.
///
/// Membership is a case-insensitive substring test so that store labels such
/// as `"Amazon BR"` or `"petz"` still count as their trusted source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustPolicy {
    ranked: Vec<String>,
}

impl TrustPolicy {
    #[must_use]
    pub fn new(ranked: Vec<String>) -> Self {
        Self {
            ranked: ranked.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    #[must_use]
    pub fn is_trusted(&self, source_name: &str) -> bool {
        self.rank(source_name).is_some()
    }

    /// Zero-based rank of the first trusted entry contained in `source_name`.
    #[must_use]
    pub fn rank(&self, source_name: &str) -> Option<usize> {
        let lower = source_name.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        self.ranked.iter().position(|t| lower.contains(t.as_str()))
    }
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_TRUSTED_SOURCES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        )
    }
}
