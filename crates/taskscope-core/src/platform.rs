//! Platforms that produce coverage data and their index naming.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system family a coverage task runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Android,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Windows, Platform::Android];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Android => "android",
        }
    }

    /// Label of the coverage build for this platform in the index.
    pub fn ccov_index_label(&self) -> &'static str {
        match self {
            Self::Linux => "linux64-ccov-debug",
            Self::Windows => "win64-ccov-debug",
            Self::Android => "android-test-ccov-opt",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::InvalidPlatform(s.to_string()))
    }
}

/// Index namespace of the coverage build for `revision` on `branch`.
pub fn index_namespace(branch: &str, revision: &str, platform: Platform) -> String {
    format!(
        "gecko.v2.{}.revision.{}.firefox.{}",
        branch,
        revision,
        platform.ccov_index_label()
    )
}
