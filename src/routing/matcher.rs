//! Request matching against route descriptors.
//!
//! # Responsibilities
//! - Match path templates (`/users/{id}`, `/files/{*rest}`)
//! - Match methods, version header/query conditions
//! - Evaluate pass-through expressions (params, headers, consumes, produces)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Header names are case-insensitive, values and paths are case-sensitive
//! - Empty condition = always matches (wildcard)
//! - No regex: templates are split into literal/capture segments once

use axum::body::Body;
use axum::extract::Query;
use axum::http::{header, Request};
use indexmap::{IndexMap, IndexSet};

use crate::routing::descriptor::{MethodSet, RouteDescriptor};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
    CatchAll(String),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a pattern. Captures must span a whole segment; a catch-all
    /// (`{*name}`) may only appear last.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        if !pattern.starts_with('/') {
            return Err(format!("path pattern {pattern:?} must start with '/'"));
        }

        let raw: Vec<&str> = if pattern == "/" {
            Vec::new()
        } else {
            pattern[1..].split('/').collect()
        };

        let mut segments = Vec::with_capacity(raw.len());
        for (i, seg) in raw.iter().enumerate() {
            let segment = match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) if name.starts_with('*') => {
                    if i + 1 != raw.len() {
                        return Err(format!("catch-all in {pattern:?} must be the last segment"));
                    }
                    Segment::CatchAll(name[1..].to_string())
                }
                Some(name) if !name.is_empty() && !name.contains(['{', '}']) => {
                    Segment::Capture(name.to_string())
                }
                Some(_) => return Err(format!("invalid capture in {pattern:?}")),
                None if seg.contains(['{', '}']) => {
                    return Err(format!("capture in {pattern:?} must span a whole segment"))
                }
                None => Segment::Literal((*seg).to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Count of literal segments; more literals = more specific.
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Match `path`, returning captured parameters on success.
    pub fn captures(&self, path: &str) -> Option<IndexMap<String, String>> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() { Vec::new() } else { rest.split('/').collect() };

        let mut params = IndexMap::new();
        let mut idx = 0;
        for segment in &self.segments {
            match segment {
                Segment::CatchAll(name) => {
                    params.insert(name.clone(), parts[idx.min(parts.len())..].join("/"));
                    return Some(params);
                }
                Segment::Literal(lit) => {
                    if parts.get(idx) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Capture(name) => match parts.get(idx) {
                    Some(value) if !value.is_empty() => {
                        params.insert(name.clone(), (*value).to_string());
                    }
                    _ => return None,
                },
            }
            idx += 1;
        }

        (idx == parts.len()).then_some(params)
    }
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: MethodSet,
}

impl MethodMatcher {
    pub fn new(methods: MethodSet) -> Self {
        Self { methods }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.methods.allows(req.method())
    }
}

/// Header must carry one of the accepted values.
#[derive(Debug, Clone)]
pub struct HeaderValuesMatcher {
    name: String,
    values: IndexSet<String>,
}

impl HeaderValuesMatcher {
    pub fn new(name: impl Into<String>, values: IndexSet<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

impl Matcher for HeaderValuesMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.headers()
            .get_all(self.name.as_str())
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| self.values.contains(v.trim()))
    }
}

/// Query parameter must carry one of the accepted values.
#[derive(Debug, Clone)]
pub struct QueryValuesMatcher {
    name: String,
    values: IndexSet<String>,
}

impl QueryValuesMatcher {
    pub fn new(name: impl Into<String>, values: IndexSet<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

impl Matcher for QueryValuesMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        query_pairs(req)
            .iter()
            .any(|(k, v)| k == &self.name && self.values.contains(v))
    }
}

fn query_pairs(req: &Request<Body>) -> Vec<(String, String)> {
    Query::<Vec<(String, String)>>::try_from_uri(req.uri())
        .map(|Query(pairs)| pairs)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpressionSource {
    Header,
    Param,
}

/// `name`, `!name`, `name=value` or `name!=value`.
#[derive(Debug, Clone)]
pub struct ExpressionMatcher {
    source: ExpressionSource,
    name: String,
    value: Option<String>,
    negated: bool,
}

impl ExpressionMatcher {
    pub fn header(expression: &str) -> Self {
        Self::parse(ExpressionSource::Header, expression)
    }

    pub fn param(expression: &str) -> Self {
        Self::parse(ExpressionSource::Param, expression)
    }

    fn parse(source: ExpressionSource, expression: &str) -> Self {
        let expression = expression.trim();
        let (name, value, negated) = if let Some((n, v)) = expression.split_once("!=") {
            (n, Some(v), true)
        } else if let Some((n, v)) = expression.split_once('=') {
            (n, Some(v), false)
        } else if let Some(n) = expression.strip_prefix('!') {
            (n, None, true)
        } else {
            (expression, None, false)
        };

        Self {
            source,
            name: name.trim().to_string(),
            value: value.map(|v| v.trim().to_string()),
            negated,
        }
    }

    fn values(&self, req: &Request<Body>) -> Vec<String> {
        match self.source {
            ExpressionSource::Header => req
                .headers()
                .get_all(self.name.as_str())
                .iter()
                .filter_map(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .collect(),
            ExpressionSource::Param => query_pairs(req)
                .into_iter()
                .filter(|(k, _)| k == &self.name)
                .map(|(_, v)| v)
                .collect(),
        }
    }
}

impl Matcher for ExpressionMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let values = self.values(req);
        let hit = match &self.value {
            Some(expected) => values.iter().any(|v| v == expected),
            None => !values.is_empty(),
        };
        hit != self.negated
    }
}

fn media_type_matches(range: &str, media: &str) -> bool {
    let range = range.trim().to_ascii_lowercase();
    let media = media.trim().to_ascii_lowercase();
    if range == "*/*" || media == "*/*" || range == media {
        return true;
    }
    match (range.split_once('/'), media.split_once('/')) {
        (Some((rt, "*")), Some((mt, _))) | (Some((rt, _)), Some((mt, "*"))) => rt == mt,
        _ => false,
    }
}

/// Content-Type must be one of the consumable media types.
#[derive(Debug, Clone)]
pub struct ConsumesMatcher {
    media_types: Vec<String>,
}

impl ConsumesMatcher {
    pub fn new(media_types: Vec<String>) -> Self {
        Self { media_types }
    }
}

impl Matcher for ConsumesMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap_or("application/octet-stream");
        self.media_types
            .iter()
            .any(|m| media_type_matches(m, content_type))
    }
}

/// Accept must admit one of the producible media types. No Accept = anything.
#[derive(Debug, Clone)]
pub struct ProducesMatcher {
    media_types: Vec<String>,
}

impl ProducesMatcher {
    pub fn new(media_types: Vec<String>) -> Self {
        Self { media_types }
    }
}

impl Matcher for ProducesMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let Some(accept) = req.headers().get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
            return true;
        };
        accept
            .split(',')
            .filter_map(|range| range.split(';').next())
            .any(|range| self.media_types.iter().any(|m| media_type_matches(range, m)))
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Version conditions of `descriptor`: one matcher per header/query name.
    pub fn version_conditions(descriptor: &RouteDescriptor) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        for (name, values) in descriptor.header_conditions().iter() {
            matchers.push(Box::new(HeaderValuesMatcher::new(name, values.clone())));
        }
        for (name, values) in descriptor.query_conditions().iter() {
            matchers.push(Box::new(QueryValuesMatcher::new(name, values.clone())));
        }
        Self::new(matchers)
    }

    /// Pass-through conditions of `descriptor`.
    pub fn pass_through(descriptor: &RouteDescriptor) -> Self {
        let pass = descriptor.pass_through();
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        matchers.extend(
            pass.params
                .iter()
                .map(|e| Box::new(ExpressionMatcher::param(e)) as Box<dyn Matcher>),
        );
        matchers.extend(
            pass.headers
                .iter()
                .map(|e| Box::new(ExpressionMatcher::header(e)) as Box<dyn Matcher>),
        );
        if !pass.consumes.is_empty() {
            matchers.push(Box::new(ConsumesMatcher::new(pass.consumes.clone())));
        }
        if !pass.produces.is_empty() {
            matchers.push(Box::new(ProducesMatcher::new(pass.produces.clone())));
        }
        Self::new(matchers)
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}
