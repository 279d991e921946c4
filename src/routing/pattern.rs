//! Path patterns
//!
//! Syntax: segments separated by `/`; a segment starting with `:` is a named
//! capture (`/user/:userId/name`), everything else matches literally.

use crate::binding::PathParams;
use crate::error::ConfigError;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::collections::HashSet;
use std::str::Utf8Error;

/// One pattern segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture(String),
}

impl Segment {
    const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

/// Parsed path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
    literal_count: usize,
    /// `true` per literal position, for left-to-right tie-breaks
    shape: Vec<bool>,
}

impl Pattern {
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(ConfigError::malformed(pattern, "must start with '/'"));
        };

        let mut segments = Vec::new();
        let mut names = HashSet::new();
        if !rest.is_empty() {
            for raw in rest.split('/') {
                if raw.is_empty() {
                    return Err(ConfigError::malformed(pattern, "empty path segment"));
                }
                let Some(name) = raw.strip_prefix(':') else {
                    // Request segments are decoded before comparison
                    if let Some(c) = raw.chars().find(|c| matches!(*c, '%' | '?' | '#')) {
                        return Err(ConfigError::malformed(
                            pattern,
                            format!("literal '{raw}' contains '{c}', write it unencoded"),
                        ));
                    }
                    segments.push(Segment::Literal(raw.to_string()));
                    continue;
                };
                if name.is_empty() {
                    return Err(ConfigError::malformed(pattern, "empty capture name"));
                }
                if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(ConfigError::malformed(
                        pattern,
                        format!("invalid capture name '{name}'"),
                    ));
                }
                if !names.insert(name) {
                    return Err(ConfigError::malformed(
                        pattern,
                        format!("capture '{name}' used twice"),
                    ));
                }
                segments.push(Segment::Capture(name.to_string()));
            }
        }

        let shape: Vec<bool> = segments.iter().map(Segment::is_literal).collect();
        Ok(Self {
            source: pattern.to_string(),
            literal_count: shape.iter().filter(|literal| **literal).count(),
            shape,
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub const fn literal_count(&self) -> usize {
        self.literal_count
    }

    /// Ordering key: more literals first, then literals further left
    pub(crate) fn specificity(&self) -> (usize, &[bool]) {
        (self.literal_count, &self.shape)
    }

    /// True when some request path would match both patterns
    pub fn collides_with(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Capture(_), Segment::Capture(_)) => true,
                    _ => false,
                })
    }

    /// Match decoded request segments, returning the captured values
    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> Option<PathParams> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, value) in self.segments.iter().zip(path) {
            let value = value.as_ref();
            match segment {
                Segment::Literal(text) if text == value => {}
                Segment::Capture(name) if !value.is_empty() => {
                    params.insert(name.as_str(), value);
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

/// Split a request path and percent-decode every segment.
///
/// Fails when a segment does not decode to UTF-8.
pub fn decode_path(path: &str) -> Result<Vec<String>, Utf8Error> {
    split_path(path)
        .into_iter()
        .map(|raw| percent_decode_str(raw).decode_utf8().map(Cow::into_owned))
        .collect()
}

/// Split a request path into segments; the root path has none
pub fn split_path(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').collect()
    }
}
