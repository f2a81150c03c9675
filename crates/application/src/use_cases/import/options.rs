//! Import options.

use serde::{Deserialize, Serialize};

use portage_domain::Resolution;

/// Where imported environments are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentMode {
    /// Scope environments to the newly created collection.
    Collection,
    /// Merge into the global environments, subject to conflict resolution.
    #[default]
    Global,
    /// Discard environments.
    Skip,
}

impl EnvironmentMode {
    /// Stable identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Global => "global",
            Self::Skip => "skip",
        }
    }
}

impl std::fmt::Display for EnvironmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnvironmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collection" => Ok(Self::Collection),
            "global" => Ok(Self::Global),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown environment mode: {other}")),
        }
    }
}

/// Default decision for conflicts the operator has not decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateHandling {
    /// Leave every conflict to the operator.
    #[default]
    Ask,
    /// Skip conflicting entities.
    Skip,
    /// Overwrite existing entities.
    Overwrite,
    /// Rename incoming entities.
    Rename,
}

impl DuplicateHandling {
    /// The resolution applied to undecided conflicts, if any.
    #[must_use]
    pub const fn resolution(&self) -> Option<Resolution> {
        match self {
            Self::Ask => None,
            Self::Skip => Some(Resolution::Skip),
            Self::Overwrite => Some(Resolution::Overwrite),
            Self::Rename => Some(Resolution::Rename),
        }
    }
}

impl std::str::FromStr for DuplicateHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ask" => Ok(Self::Ask),
            other => other
                .parse::<Resolution>()
                .map(|resolution| match resolution {
                    Resolution::Skip => Self::Skip,
                    Resolution::Overwrite => Self::Overwrite,
                    Resolution::Rename => Self::Rename,
                })
                .map_err(|_| format!("unknown duplicate handling: {other}")),
        }
    }
}

/// Options controlling how a parsed document is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Environment routing.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,
    /// Default decision for undecided conflicts.
    #[serde(default)]
    pub duplicate_handling: DuplicateHandling,
    /// Commit disabled headers, params and variables too.
    #[serde(default)]
    pub include_disabled: bool,
}

impl ImportOptions {
    /// Environment mode actually applied.
    ///
    /// `Collection` needs a collection to attach to; documents without one
    /// fall back to `Global`.
    #[must_use]
    pub const fn effective_environment_mode(&self, has_collection: bool) -> EnvironmentMode {
        match self.environment_mode {
            EnvironmentMode::Collection if !has_collection => EnvironmentMode::Global,
            mode => mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_mode_falls_back_without_collection() {
        let options = ImportOptions {
            environment_mode: EnvironmentMode::Collection,
            ..ImportOptions::default()
        };
        assert_eq!(
            options.effective_environment_mode(false),
            EnvironmentMode::Global
        );
        assert_eq!(
            options.effective_environment_mode(true),
            EnvironmentMode::Collection
        );
    }

    #[test]
    fn test_duplicate_handling_parses() {
        assert_eq!("ask".parse(), Ok(DuplicateHandling::Ask));
        assert_eq!("rename".parse(), Ok(DuplicateHandling::Rename));
        assert!("merge".parse::<DuplicateHandling>().is_err());
        assert_eq!(DuplicateHandling::Ask.resolution(), None);
    }
}
