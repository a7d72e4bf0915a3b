//! Requested-version parsing and the version-current gate.
//!
//! Firmware versions appear in two notations: filename notation (`4.1.3b`),
//! which bundle filenames embed, and display notation (`4.1(3b)`), which a
//! managed domain reports about itself. Both are rendered from one parsed
//! value so they can never drift apart.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A malformed requested-version string. This is a configuration error and
/// is raised before any target is contacted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version '{0}': expected <major>.<minor>.<sub-release><letter>, e.g. 4.1.3b")]
    Malformed(String),
}

/// A validated requested firmware version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    major: u32,
    minor: u32,
    /// Sub-release digits plus the trailing letter, e.g. `3b`. The letter is
    /// compared case-sensitively.
    sub_release: String,
}

impl VersionSpec {
    /// Parse filename notation (`4.1.3b`).
    ///
    /// The three fields are extracted explicitly rather than by best-effort
    /// substitution: major and minor must be decimal numbers, the sub-release
    /// must be one or more digits followed by exactly one ASCII letter.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let malformed = || VersionError::Malformed(input.to_string());

        let mut parts = input.split('.');
        let (major, minor, sub) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(major), Some(minor), Some(sub), None) => (major, minor, sub),
            _ => return Err(malformed()),
        };

        let major: u32 = major.parse().map_err(|_| malformed())?;
        let minor: u32 = minor.parse().map_err(|_| malformed())?;

        if !sub.is_ascii() {
            return Err(malformed());
        }
        let (digits, letter) = sub.split_at(sub.len().saturating_sub(1));
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if !letter.chars().all(|c| c.is_ascii_alphabetic()) || letter.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            major,
            minor,
            sub_release: sub.to_string(),
        })
    }

    /// Filename notation, e.g. `4.1.3b`.
    pub fn filename_notation(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.sub_release)
    }

    /// Display notation, e.g. `4.1(3b)`. This is the form managed domains
    /// report through their management interface.
    pub fn display_notation(&self) -> String {
        format!("{}.{}({})", self.major, self.minor, self.sub_release)
    }

    /// Exact-match version gate: true iff the reported string equals the
    /// display rendering of this version. No partial or ordered comparison
    /// is ever performed.
    pub fn is_current(&self, reported: &str) -> bool {
        reported == self.display_notation()
    }
}

impl FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename_notation())
    }
}
