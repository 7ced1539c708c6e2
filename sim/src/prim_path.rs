//! Scene namespace paths.
//!
//! # Model
//! - A [`PrimPath`] is absolute and `/`-separated: `/World/Objects/Cone1`.
//! - Segments are non-empty and use `[A-Za-z0-9_]` only.
//! - The pseudo-root `/` has no segments and is the parent of top-level prims.
//!
//! # Patterns
//! A [`PrimPattern`] is written like a path, but each segment is an anchored
//! regular expression: `/World/Origin.*/Cone` names a `Cone` under every
//! prim matching `/World/Origin.*`. The last segment of a pattern must be a
//! literal name since it is the prim being created.

use std::fmt;

use regex::Regex;

use crate::error::SceneSetupError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimPath {
    segments: Vec<String>,
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn invalid(path: &str, reason: &'static str) -> SceneSetupError {
    SceneSetupError::InvalidPath {
        path: path.to_string(),
        reason,
    }
}

impl PrimPath {
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn parse(path: &str) -> Result<Self, SceneSetupError> {
        let Some(rest) = path.strip_prefix('/') else {
            return Err(invalid(path, "path must be absolute"));
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Err(invalid(path, "empty path segment"));
            }
            if !is_valid_segment(segment) {
                return Err(invalid(path, "segments may only contain [A-Za-z0-9_]"));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parent path; the root is its own parent.
    pub fn parent(&self) -> PrimPath {
        let mut segments = self.segments.clone();
        segments.pop();
        PrimPath { segments }
    }

    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn join(&self, name: &str) -> Result<PrimPath, SceneSetupError> {
        if !is_valid_segment(name) {
            return Err(invalid(name, "segments may only contain [A-Za-z0-9_]"));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(PrimPath { segments })
    }
}

impl fmt::Display for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// A path whose parent segments are regular expressions.
#[derive(Clone, Debug)]
pub struct PrimPattern {
    source: String,
    parent_segments: Vec<Regex>,
    name: String,
}

impl PrimPattern {
    pub fn parse(pattern: &str) -> Result<Self, SceneSetupError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(invalid(pattern, "pattern must be absolute"));
        };
        let mut raw: Vec<&str> = rest.split('/').collect();
        if raw.iter().any(|s| s.is_empty()) {
            return Err(invalid(pattern, "empty path segment"));
        }
        let name = raw.pop().unwrap_or_default();
        if !is_valid_segment(name) {
            return Err(invalid(pattern, "last pattern segment must be a literal prim name"));
        }
        let mut parent_segments = Vec::with_capacity(raw.len());
        for segment in raw {
            let anchored = format!("^(?:{segment})$");
            let re = Regex::new(&anchored)
                .map_err(|_| invalid(pattern, "segment is not a valid regular expression"))?;
            parent_segments.push(re);
        }
        Ok(Self {
            source: pattern.to_string(),
            parent_segments,
            name: name.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Name of the prim created under each matching parent.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Does `parent` match the parent part of this pattern?
    pub fn matches_parent(&self, parent: &PrimPath) -> bool {
        parent.depth() == self.parent_segments.len()
            && parent
                .segments()
                .iter()
                .zip(&self.parent_segments)
                .all(|(segment, re)| re.is_match(segment))
    }

    /// Concrete paths this pattern expands to, given the set of existing prims.
    pub fn expand<'a>(&self, existing: impl IntoIterator<Item = &'a PrimPath>) -> Vec<PrimPath> {
        let mut out: Vec<PrimPath> = existing
            .into_iter()
            .filter(|p| self.matches_parent(p))
            .filter_map(|p| p.join(&self.name).ok())
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

impl fmt::Display for PrimPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let path = PrimPath::parse("/World/Objects/Cone1").unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(path.name(), Some("Cone1"));
        assert_eq!(path.to_string(), "/World/Objects/Cone1");
        assert_eq!(path.parent().to_string(), "/World/Objects");
    }

    #[test]
    fn root_is_its_own_parent() {
        let root = PrimPath::parse("/").unwrap();
        assert!(root.is_root());
        assert_eq!(root.parent(), root);
        assert_eq!(PrimPath::parse("/World").unwrap().parent(), root);
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["World", "/World/", "//World", "/World/a-b", "/World/a b", ""] {
            assert!(
                matches!(PrimPath::parse(bad), Err(SceneSetupError::InvalidPath { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn pattern_expands_against_matching_parents_only() {
        let existing: Vec<PrimPath> = [
            "/World",
            "/World/Origin0",
            "/World/Origin1",
            "/World/Light",
            "/World/Origin0/Table",
        ]
        .iter()
        .map(|p| PrimPath::parse(p).unwrap())
        .collect();

        let pattern = PrimPattern::parse("/World/Origin.*/Cone").unwrap();
        let expanded: Vec<String> = pattern
            .expand(&existing)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(expanded, vec!["/World/Origin0/Cone", "/World/Origin1/Cone"]);
    }

    #[test]
    fn pattern_segments_are_anchored() {
        let pattern = PrimPattern::parse("/World/Origin/Cone").unwrap();
        assert!(pattern.matches_parent(&PrimPath::parse("/World/Origin").unwrap()));
        assert!(!pattern.matches_parent(&PrimPath::parse("/World/Origin0").unwrap()));
        assert!(!pattern.matches_parent(&PrimPath::parse("/MyWorld/Origin").unwrap()));
    }

    #[test]
    fn pattern_name_must_be_literal() {
        assert!(PrimPattern::parse("/World/Origin.*/Cone.*").is_err());
        assert!(PrimPattern::parse("/World/Origin[/Cone").is_err());
    }
}
