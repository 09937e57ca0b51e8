/// Resource path patterns and glob matching
///
/// Provides the core PathPattern type with segment-wise wildcard
/// matching over `/`-delimited request paths.

use std::fmt;
use std::str::FromStr;

/// Result type for pattern operations
pub type PatternResult<T> = Result<T, PatternError>;

/// Errors that can occur while parsing a path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Empty pattern string provided
    EmptyPattern,
    /// Pattern does not start with `/`
    MissingLeadingSlash(String),
    /// Pattern segment is empty
    EmptySegment,
    /// Invalid wildcard usage
    InvalidWildcard(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPattern => write!(f, "Pattern cannot be empty"),
            Self::MissingLeadingSlash(p) => write!(f, "Pattern must start with '/': '{}'", p),
            Self::EmptySegment => write!(f, "Pattern segment cannot be empty"),
            Self::InvalidWildcard(msg) => write!(f, "Invalid wildcard usage: {}", msg),
        }
    }
}

impl std::error::Error for PatternError {}

/// A glob-style resource path pattern
///
/// Patterns are `/`-delimited and support two wildcard forms:
/// - `*` matches exactly one segment and never crosses a `/`
/// - `**` matches zero or more trailing segments
///
/// Matching is case-sensitive and anchored to the whole path. A trailing
/// `**` is the only way to match variable depth.
///
/// # Examples
///
/// ```
/// use warden_authz::pattern::PathPattern;
///
/// let pattern = PathPattern::parse("/users/**").unwrap();
/// assert!(pattern.matches("/users/1/profile"));
/// assert!(pattern.matches("/users"));
///
/// let pattern = PathPattern::parse("/users/*").unwrap();
/// assert!(pattern.matches("/users/1"));
/// assert!(!pattern.matches("/users/1/profile"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
    /// Original pattern string
    raw: String,
    /// Parsed segments
    segments: Vec<String>,
}

impl PathPattern {
    /// Parse and validate a pattern string.
    ///
    /// Validation rules: the pattern must start with `/`, segments must be
    /// non-empty, wildcards must be standalone segments, and `**` may only
    /// appear in the final position.
    pub fn parse(s: &str) -> PatternResult<Self> {
        if s.is_empty() {
            return Err(PatternError::EmptyPattern);
        }

        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(s.to_string()))?;

        let segments: Vec<String> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').map(str::to_string).collect()
        };

        for (idx, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(PatternError::EmptySegment);
            }

            if segment.contains('*') && segment != "*" && segment != "**" {
                return Err(PatternError::InvalidWildcard(format!(
                    "wildcards must be standalone segments: '{}'",
                    segment
                )));
            }

            if segment == "**" && idx < segments.len() - 1 {
                return Err(PatternError::InvalidWildcard(
                    "'**' can only appear at the end".to_string(),
                ));
            }
        }

        Ok(Self {
            raw: s.to_string(),
            segments,
        })
    }

    /// Returns the original pattern string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whole-path match of a request path against this pattern.
    ///
    /// Never fails: a malformed path simply does not match.
    pub fn matches(&self, path: &str) -> bool {
        let path_segments = split_path(path);

        if let Some(last) = self.segments.last() {
            if last == "**" {
                return Self::prefix_matches(
                    &self.segments[..self.segments.len() - 1],
                    &path_segments,
                );
            }
        }

        if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(path_segments.iter())
            .all(|(pat, seg)| pat.as_str() == "*" || pat.as_str() == *seg)
    }

    fn prefix_matches(prefix: &[String], segments: &[&str]) -> bool {
        if prefix.len() > segments.len() {
            return false;
        }

        prefix
            .iter()
            .zip(segments.iter())
            .all(|(pat, seg)| pat.as_str() == "*" || pat.as_str() == *seg)
    }
}

impl FromStr for PathPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Split a request path into segments; no validation happens here because
/// evaluation-time matching must never report a path error
fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}
