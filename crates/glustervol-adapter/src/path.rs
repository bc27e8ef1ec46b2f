//! Abstract paths and their translation to native mount paths.
//!
//! An abstract path is what the scheduler hands us: a slash-separated
//! hierarchical path, optionally qualified with `scheme://authority`.
//! Translation drops the qualifier and passes the hierarchical part through
//! unchanged; the mount root is never prefixed or stripped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Path separator of the abstract namespace.
pub const SEPARATOR: char = '/';

/// Scheduler-facing hierarchical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct AbstractPath {
    scheme: Option<String>,
    authority: Option<String>,
    path: String,
}

impl AbstractPath {
    /// Parses `scheme://authority/path`, `scheme:/path`, or a bare path.
    ///
    /// Repeated separators collapse and a trailing separator is dropped.
    /// Never fails: anything that is not a qualified URI is a bare path.
    pub fn parse(input: &str) -> Self {
        let (scheme, rest) = match split_scheme(input) {
            Some((scheme, rest)) => (Some(scheme.to_string()), rest),
            None => (None, input),
        };

        let (authority, raw_path) = match (&scheme, rest.strip_prefix("//")) {
            (Some(_), Some(after)) => match after.find(SEPARATOR) {
                Some(idx) => (Some(after[..idx].to_string()), &after[idx..]),
                None => (Some(after.to_string()), ""),
            },
            _ => (None, rest),
        };

        let mut path = normalize(raw_path);
        if scheme.is_some() && path.is_empty() {
            path.push(SEPARATOR);
        }

        Self {
            scheme,
            authority,
            path,
        }
    }

    /// Wraps a native path string without altering it.
    pub fn from_native(native: &str) -> Self {
        Self {
            scheme: None,
            authority: None,
            path: native.to_string(),
        }
    }

    /// URI scheme, if qualified.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// URI authority, if qualified. May be empty, as in `glusterfs:///`.
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Hierarchical part.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when the hierarchical part starts at the root.
    pub fn is_absolute(&self) -> bool {
        self.path.starts_with(SEPARATOR)
    }

    /// Final component, or the empty string for the root.
    pub fn name(&self) -> &str {
        self.path.rsplit(SEPARATOR).next().unwrap_or_default()
    }
}

impl fmt::Display for AbstractPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{}:", scheme)?;
            if let Some(authority) = &self.authority {
                write!(f, "//{}", authority)?;
            }
        }
        write!(f, "{}", self.path)
    }
}

impl FromStr for AbstractPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for AbstractPath {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for AbstractPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<AbstractPath> for String {
    fn from(p: AbstractPath) -> Self {
        p.to_string()
    }
}

fn split_scheme(input: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = input.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some((scheme, rest))
    } else {
        None
    }
}

fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_sep = false;
    for c in raw.chars() {
        if c == SEPARATOR {
            if prev_sep {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        out.push(c);
    }
    if out.len() > 1 && out.ends_with(SEPARATOR) {
        out.pop();
    }
    out
}

/// Stateless mapping between abstract paths and native paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathTranslator;

impl PathTranslator {
    /// Native path of `path`: the hierarchical part, scheme and authority dropped.
    pub fn to_native(&self, path: &AbstractPath) -> String {
        trace!("to_native: {}", path);
        path.path().to_string()
    }

    /// Abstract path wrapping the native path `native` unchanged.
    pub fn to_abstract(&self, native: &str) -> AbstractPath {
        trace!("to_abstract: {}", native);
        AbstractPath::from_native(native)
    }
}
