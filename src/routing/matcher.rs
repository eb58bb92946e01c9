//! Route pattern matching.
//!
//! # Responsibilities
//! - Parse a manifest's `route` string into segments
//! - Match request paths (case-sensitive) and capture parameters
//! - Produce a normalized key used for duplicate detection
//!
//! # Design Decisions
//! - Empty segments are ignored, so `/a//b/` and `/a/b` are the same route
//! - `:name` and `{name}` capture one segment; `*name` and `{*name}` capture
//!   the rest of the path and may only appear last
//! - Parameter names do not take part in the key: `/u/:id` and `/u/{uid}`
//!   claim the same route
//! - Captured values are percent-decoded; a capture that does not decode to
//!   UTF-8 makes the path not match. Literal segments compare raw
//! - No regex to guarantee O(n) matching

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Parameters captured while matching a path.
pub type PathParams = HashMap<String, String>;

/// Reasons a route string is not a usable pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("route must start with '/'")]
    MissingLeadingSlash,

    #[error("route segment '{0}' has an empty parameter name")]
    EmptyParam(String),

    #[error("catch-all segment '{0}' must be the last segment")]
    CatchAllNotLast(String),

    #[error("route declares parameter '{0}' twice")]
    DuplicateParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    CatchAll(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    key: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a route string from a manifest.
    pub fn parse(route: &str) -> Result<Self, PatternError> {
        if !route.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash);
        }

        let parts: Vec<&str> = split_path(route).collect();
        let mut segments = Vec::with_capacity(parts.len());
        let mut seen = Vec::new();

        for (i, part) in parts.iter().enumerate() {
            let segment = parse_segment(part)?;
            match &segment {
                Segment::CatchAll(name) if i + 1 != parts.len() => {
                    return Err(PatternError::CatchAllNotLast(name.clone()));
                }
                Segment::Param(name) | Segment::CatchAll(name) => {
                    if seen.contains(name) {
                        return Err(PatternError::DuplicateParam(name.clone()));
                    }
                    seen.push(name.clone());
                }
                Segment::Literal(_) => {}
            }
            segments.push(segment);
        }

        let key = render_key(&segments);
        Ok(Self {
            raw: route.to_string(),
            key,
            segments,
        })
    }

    /// The route string as written in the manifest.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized form used as the dispatch key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when the pattern has no captures and can be looked up by key.
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Match a request path, returning captured parameters on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = split_path(path).collect();
        let mut params = PathParams::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.insert(name.clone(), decode(value)?);
                }
                Segment::CatchAll(name) => {
                    let rest = parts[i.min(parts.len())..]
                        .iter()
                        .map(|p| decode(p))
                        .collect::<Option<Vec<_>>>()?;
                    params.insert(name.clone(), rest.join("/"));
                    return Some(params);
                }
            }
        }

        if parts.len() == self.segments.len() {
            Some(params)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Normalize a request path the same way static keys are rendered.
pub fn normalize_path(path: &str) -> String {
    let joined = split_path(path).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

fn decode(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn parse_segment(part: &str) -> Result<Segment, PatternError> {
    let inner = part
        .strip_prefix('{')
        .and_then(|p| p.strip_suffix('}'));

    let (is_catch_all, name) = match inner {
        Some(braced) => match braced.strip_prefix('*') {
            Some(name) => (true, name),
            None => (false, braced),
        },
        None => {
            if let Some(name) = part.strip_prefix(':') {
                (false, name)
            } else if let Some(name) = part.strip_prefix('*') {
                (true, name)
            } else {
                return Ok(Segment::Literal(part.to_string()));
            }
        }
    };

    if name.is_empty() {
        return Err(PatternError::EmptyParam(part.to_string()));
    }

    Ok(if is_catch_all {
        Segment::CatchAll(name.to_string())
    } else {
        Segment::Param(name.to_string())
    })
}

fn render_key(segments: &[Segment]) -> String {
    let rendered: Vec<&str> = segments
        .iter()
        .map(|s| match s {
            Segment::Literal(lit) => lit.as_str(),
            Segment::Param(_) => "{}",
            Segment::CatchAll(_) => "{*}",
        })
        .collect();
    format!("/{}", rendered.join("/"))
}
