//! Route patterns: compilation and segment-by-segment matching.
//!
//! A pattern is split on `/` into segments. Empty parts are kept, so `"/"`
//! has two segments (`""` and `""`) and `"/a/"` has three. A segment that
//! starts with `:` is a variable and captures whatever path text sits at
//! the same position; every other segment must match byte-for-byte.
//!
//! ```text
//! pattern  /project/:projectId      ["", "project", :projectId]
//! path     /project/42              ["", "project", "42"]
//!                                    ✓   ✓          projectId = "42"
//! ```
//!
//! There is no prefix matching and no wildcard: a path only matches a
//! pattern with exactly as many segments.

use std::collections::HashMap;
use std::fmt;

use crate::error::RouteError;

/// Marks a variable segment.
const VARIABLE_MARKER: char = ':';

/// Path parameters captured by a match, keyed by variable name.
pub type Params = HashMap<String, String>;

/// Whether a segment is compared literally or captured.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentKind {
    Literal,
    Variable,
}

/// One `/`-delimited element of a compiled pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Segment {
    value: String,
    kind: SegmentKind,
}

impl Segment {
    pub fn literal(value: impl Into<String>) -> Self {
        Self { value: value.into(), kind: SegmentKind::Literal }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self { value: name.into(), kind: SegmentKind::Variable }
    }

    /// Literal text, or the variable name (without the `:`).
    pub fn value(&self) -> &str { &self.value }
    pub fn kind(&self) -> SegmentKind { self.kind }
    pub fn is_variable(&self) -> bool { self.kind == SegmentKind::Variable }
}

/// A compiled route pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compiles `pattern`.
    ///
    /// Fails if a segment is a bare `:`: a variable must have a name.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let segments = pattern
            .split('/')
            .enumerate()
            .map(|(index, raw)| match raw.strip_prefix(VARIABLE_MARKER) {
                Some("") => Err(RouteError::EmptyVariable {
                    pattern: pattern.to_owned(),
                    index,
                }),
                Some(name) => Ok(Segment::variable(name)),
                None => Ok(Segment::literal(raw)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { raw: pattern.to_owned(), segments })
    }

    /// The pattern exactly as it was registered.
    pub fn as_str(&self) -> &str { &self.raw }

    pub fn segments(&self) -> &[Segment] { &self.segments }

    /// Names that appear on more than one variable segment.
    pub(crate) fn duplicate_variables(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        let mut dupes = Vec::new();
        for seg in self.segments.iter().filter(|s| s.is_variable()) {
            if seen.contains(&seg.value()) {
                if !dupes.contains(&seg.value()) {
                    dupes.push(seg.value());
                }
            } else {
                seen.push(seg.value());
            }
        }
        dupes
    }

    /// Matches a raw request path, returning the captured variables.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = path.split('/').collect();
        self.matches_parts(&parts)
    }

    /// Matches a path that has already been split on `/`.
    ///
    /// Captures are inserted left to right, so a repeated variable name keeps
    /// the rightmost value.
    pub(crate) fn matches_parts(&self, parts: &[&str]) -> Option<Params> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment.kind {
                SegmentKind::Variable => {
                    params.insert(segment.value.clone(), (*part).to_owned());
                }
                SegmentKind::Literal if segment.value == *part => {}
                SegmentKind::Literal => return None,
            }
        }
        Some(params)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_compiles_to_two_empty_literals() {
        let p = Pattern::parse("/").unwrap();
        assert_eq!(p.segments(), &[Segment::literal(""), Segment::literal("")]);
    }

    #[test]
    fn trailing_slash_keeps_empty_segment() {
        let p = Pattern::parse("/a/").unwrap();
        assert_eq!(p.segments().len(), 3);
        assert_eq!(p.segments()[2], Segment::literal(""));
    }

    #[test]
    fn colon_prefix_is_a_variable() {
        let p = Pattern::parse("/project/:projectId").unwrap();
        assert_eq!(
            p.segments(),
            &[
                Segment::literal(""),
                Segment::literal("project"),
                Segment::variable("projectId"),
            ]
        );
        assert_eq!(p.as_str(), "/project/:projectId");
    }

    #[test]
    fn colon_only_inside_segment_is_literal() {
        let p = Pattern::parse("/a:b").unwrap();
        assert_eq!(p.segments()[1], Segment::literal("a:b"));
    }

    #[test]
    fn empty_variable_name_is_rejected() {
        let err = Pattern::parse("/users/:/posts").unwrap_err();
        assert_eq!(
            err,
            RouteError::EmptyVariable { pattern: "/users/:/posts".into(), index: 2 }
        );
    }

    #[test]
    fn captures_variable_segments() {
        let p = Pattern::parse("/project/:projectId/task/:taskId").unwrap();
        let params = p.matches("/project/1/task/abc").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params["projectId"], "1");
        assert_eq!(params["taskId"], "abc");
    }

    #[test]
    fn segment_count_must_be_equal() {
        let p = Pattern::parse("/project/:projectId").unwrap();
        assert!(p.matches("/project").is_none());
        assert!(p.matches("/project/1/extra").is_none());
        assert!(p.matches("/project/1/").is_none());
    }

    #[test]
    fn literals_are_case_sensitive() {
        let p = Pattern::parse("/About").unwrap();
        assert!(p.matches("/About").is_some());
        assert!(p.matches("/about").is_none());
    }

    #[test]
    fn variable_matches_empty_segment() {
        let p = Pattern::parse("/users/:id").unwrap();
        assert_eq!(p.matches("/users/").unwrap()["id"], "");
    }

    #[test]
    fn repeated_variable_keeps_last_capture() {
        let p = Pattern::parse("/:x/:x").unwrap();
        assert_eq!(p.duplicate_variables(), vec!["x"]);
        assert_eq!(p.matches("/first/second").unwrap()["x"], "second");
    }

    #[test]
    fn captured_text_is_not_decoded() {
        let p = Pattern::parse("/files/:name").unwrap();
        assert_eq!(p.matches("/files/a%20b").unwrap()["name"], "a%20b");
    }
}
