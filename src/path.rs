//! Binding paths
//!
//! A path locates a value inside a nested model. It can be written as a
//! dotted string (`"address.city"`) or as an explicit segment sequence
//! (`["address", "city"]`); both normalize to the same [`Path`].
//!
//! - `""` and `[]` are the root (the whole model)
//! - numeric segments index into arrays (`"items.0.name"`)
//! - empty segments (`"a..b"`, `"a."`) are rejected

use std::fmt;

use smallvec::SmallVec;

use crate::error::BindError;

/// Parsed path: an ordered list of segment names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: SmallVec<[String; 4]>,
}

impl Path {
    /// The empty path (whole model).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted string.
    ///
    /// Examples:
    /// - "" → root
    /// - "a.b.c" → [a, b, c]
    /// - "items.0" → [items, 0]
    pub fn parse(path: &str) -> Result<Self, BindError> {
        if path.is_empty() {
            return Ok(Self::root());
        }
        Self::from_segments(path.split('.'))
    }

    /// Build from explicit segments. Segments are taken verbatim (no split on `.`).
    pub fn from_segments<I, S>(segments: I) -> Result<Self, BindError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: SmallVec<[String; 4]> = segments.into_iter().map(Into::into).collect();
        if segments.iter().any(String::is_empty) {
            return Err(BindError::InvalidPath {
                path: segments.join("."),
                reason: "empty segment".to_string(),
            });
        }
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` for the root.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Path without its last segment, `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.iter().cloned().collect(),
        })
    }

    /// Canonical registry key: segments joined by `.`.
    pub fn key(&self) -> String {
        self.segments.join(".")
    }

    /// Concatenate `self` and `other`.
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Append one segment.
    pub fn child(&self, segment: impl Into<String>) -> Path {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Segment-wise prefix test. The root is a prefix of every path.
    ///
    /// `a` is a prefix of `a.b`, but not of `ab`.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        self.segments.len() <= other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }

    /// True when one path is a prefix of the other (ancestor, equal or descendant).
    pub fn overlaps(&self, other: &Path) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("$")
        } else {
            f.write_str(&self.key())
        }
    }
}

/// Conversion into a [`Path`] at the API boundary.
///
/// Strings are split on `.`; sequences are taken segment by segment.
pub trait IntoPath {
    fn into_path(self) -> Result<Path, BindError>;
}

impl IntoPath for Path {
    fn into_path(self) -> Result<Path, BindError> {
        Ok(self)
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> Result<Path, BindError> {
        Ok(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Result<Path, BindError> {
        Path::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Result<Path, BindError> {
        Path::parse(&self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Result<Path, BindError> {
        Path::parse(self)
    }
}

impl IntoPath for &[&str] {
    fn into_path(self) -> Result<Path, BindError> {
        Path::from_segments(self.iter().copied())
    }
}

impl IntoPath for &[String] {
    fn into_path(self) -> Result<Path, BindError> {
        Path::from_segments(self.iter().cloned())
    }
}

impl<const N: usize> IntoPath for [&str; N] {
    fn into_path(self) -> Result<Path, BindError> {
        Path::from_segments(self)
    }
}

impl IntoPath for Vec<&str> {
    fn into_path(self) -> Result<Path, BindError> {
        Path::from_segments(self)
    }
}

impl IntoPath for Vec<String> {
    fn into_path(self) -> Result<Path, BindError> {
        Path::from_segments(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn parse_dotted() {
        assert_eq!(p("a.b.c").segments(), ["a", "b", "c"]);
    }

    #[test]
    fn empty_string_is_root() {
        assert!(p("").is_root());
        assert_eq!(p("").key(), "");
        assert_eq!(p("").to_string(), "$");
    }

    #[test]
    fn string_and_sequence_normalize_to_same_key() {
        let from_str = "a.b.c".into_path().unwrap();
        let from_seq = ["a", "b", "c"].into_path().unwrap();
        let from_vec = vec!["a".to_string(), "b".to_string(), "c".to_string()]
            .into_path()
            .unwrap();
        assert_eq!(from_str, from_seq);
        assert_eq!(from_seq, from_vec);
        assert_eq!(from_str.key(), "a.b.c");
    }

    #[test]
    fn empty_segments_rejected() {
        for bad in ["a..b", "a.", ".a", "."] {
            let err = Path::parse(bad).unwrap_err();
            assert!(matches!(err, BindError::InvalidPath { .. }), "{bad}");
        }
        assert!(["a", ""].into_path().is_err());
    }

    #[test]
    fn sequence_segments_are_not_split() {
        let path = ["a.b"].into_path().unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.key(), "a.b");
    }

    #[test]
    fn prefix_is_segment_wise() {
        assert!(p("a").is_prefix_of(&p("a.b")));
        assert!(p("a.b").is_prefix_of(&p("a.b")));
        assert!(!p("a").is_prefix_of(&p("ab")));
        assert!(!p("a.b").is_prefix_of(&p("a")));
        assert!(Path::root().is_prefix_of(&p("x.y")));
    }

    #[test]
    fn overlap_rule() {
        let watched = p("a.b");
        assert!(watched.overlaps(&p("a.b.c")));
        assert!(watched.overlaps(&p("a")));
        assert!(watched.overlaps(&p("a.b")));
        assert!(watched.overlaps(&Path::root()));
        assert!(!watched.overlaps(&p("x.y")));
        assert!(!watched.overlaps(&p("a.bc")));
        assert!(!p("a").overlaps(&p("ab")));
    }

    #[test]
    fn parent_and_join() {
        let path = p("a.b.c");
        assert_eq!(path.parent().unwrap(), p("a.b"));
        assert_eq!(path.last(), Some("c"));
        assert!(Path::root().parent().is_none());
        assert_eq!(p("a").join(&p("b.c")), path);
        assert_eq!(p("a.b").child("c"), path);
    }
}
