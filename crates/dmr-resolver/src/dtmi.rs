//! Digital Twin Model Identifier syntax and repository path conventions.
//!
//! A DTMI has the shape `dtmi:<segment>(:<segment>)*;<version>`. Repository
//! paths are derived purely syntactically: the identifier is lower-cased,
//! `:` becomes `/`, `;` becomes `-`, and `.json` (or `.expanded.json`) is
//! appended.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::messages;

pub const DTMI_SCHEME: &str = "dtmi";
pub const MAX_DTMI_VERSION: u32 = 999_999_999;
pub const MODEL_FILE_SUFFIX: &str = ".json";
pub const EXPANDED_MODEL_FILE_SUFFIX: &str = ".expanded.json";

const MAX_VERSION_DIGITS: usize = 9;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", messages::invalid_dtmi_format(.0))]
/// Raised when a string does not follow the DTMI grammar.
pub struct InvalidDtmi(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// A syntactically valid model identifier. Casing is preserved verbatim.
pub struct Dtmi(String);

impl Dtmi {
    pub fn parse(value: &str) -> Result<Self, InvalidDtmi> {
        if is_valid_dtmi(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidDtmi(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Colon-delimited path segments, starting with the `dtmi` scheme segment.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path_part().split(':')
    }

    pub fn version(&self) -> u32 {
        self.0
            .rsplit_once(';')
            .and_then(|(_, version)| version.parse::<u32>().ok())
            .unwrap_or_default()
    }

    /// Repository-relative path, e.g. `dtmi/com/example/thermostat-1.json`.
    pub fn to_relative_path(&self, expanded: bool) -> String {
        let suffix = if expanded {
            EXPANDED_MODEL_FILE_SUFFIX
        } else {
            MODEL_FILE_SUFFIX
        };
        let mut path = self.0.to_ascii_lowercase().replace(':', "/").replace(';', "-");
        path.push_str(suffix);
        path
    }

    fn path_part(&self) -> &str {
        self.0
            .rsplit_once(';')
            .map(|(path, _)| path)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for Dtmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Dtmi {
    type Err = InvalidDtmi;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl AsRef<str> for Dtmi {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Pure syntactic check; never touches storage.
pub fn is_valid_dtmi(value: &str) -> bool {
    let Some(rest) = value
        .strip_prefix(DTMI_SCHEME)
        .and_then(|rest| rest.strip_prefix(':'))
    else {
        return false;
    };
    let Some((path, version)) = rest.rsplit_once(';') else {
        return false;
    };
    path.split(':').all(is_valid_segment) && is_valid_version(version)
}

fn is_valid_segment(segment: &str) -> bool {
    let Some(first) = segment.chars().next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        && !segment.ends_with('_')
}

fn is_valid_version(version: &str) -> bool {
    !version.is_empty()
        && version.len() <= MAX_VERSION_DIGITS
        && !version.starts_with('0')
        && version.chars().all(|ch| ch.is_ascii_digit())
}

/// Repository-relative path for `dtmi`.
pub fn to_relative_path(dtmi: &str, expanded: bool) -> Result<String, InvalidDtmi> {
    Ok(Dtmi::parse(dtmi)?.to_relative_path(expanded))
}

/// Full path of `dtmi` joined onto a repository base (directory path or URL).
pub fn to_path(dtmi: &str, base: &str, expanded: bool) -> Result<String, InvalidDtmi> {
    let relative = to_relative_path(dtmi, expanded)?;
    let base = base.trim_end_matches(['/', '\\']);
    if base.is_empty() {
        return Ok(relative);
    }
    Ok(format!("{base}/{relative}"))
}

/// Decodes a repository path (relative or full) back into an identifier.
///
/// Paths are lower-cased on the way in, so the decoded identifier matches the
/// original up to letter case only. This deliberately gives up exact-string
/// round-tripping for mixed-case identifiers (`Dtmi` equality stays
/// case-sensitive) in favor of the lower-case repository layout. Exact casing
/// is instead enforced after each fetch, by comparing the requested
/// identifier with the document's declared `@id`.
pub fn dtmi_from_path(path: &str) -> Option<String> {
    let normalized = path.replace('\\', "/");
    let stem = normalized
        .strip_suffix(EXPANDED_MODEL_FILE_SUFFIX)
        .or_else(|| normalized.strip_suffix(MODEL_FILE_SUFFIX))?;
    let start = if stem.starts_with("dtmi/") {
        0
    } else {
        stem.find("/dtmi/")? + 1
    };
    let (segments, version) = stem[start..].rsplit_once('-')?;
    let candidate = format!("{};{}", segments.replace('/', ":"), version);
    is_valid_dtmi(&candidate).then_some(candidate)
}
