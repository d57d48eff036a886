//! Task classification from naming conventions.
//!
//! Task names follow `<kind>-<platform>[-ccov]/<buildtype>[-<suite>]`, for
//! example `test-linux64-ccov/debug-mochitest-e10s-7` or
//! `build-win64-ccov/debug`. Everything here is a pure function of the name.
//!
//! Names that do not follow the convention are reported as
//! [`ClassifyError::Unrecognized`] by every fallible function; they are never
//! passed through as-is.

use crate::{ClassifyError, Platform, TaskDescriptor};
use serde::{Deserialize, Serialize};

/// Token carried by the head segment of instrumented tasks.
const COVERAGE_TOKEN: &str = "ccov";

/// Token marking multi-process test runs.
const E10S_TOKEN: &str = "e10s";

/// Placeholder chunk for build tasks, which have no suite.
const BUILD_CHUNK: &str = "build";

/// Platform tokens in priority order. `android-test` must win over anything
/// else, `win` covers both `win64` and `windows10-64`.
const PLATFORM_TOKENS: &[(&str, Platform)] = &[
    ("android", Platform::Android),
    ("linux", Platform::Linux),
    ("win", Platform::Windows),
];

/// Structured identity of a coverage task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskIdentity {
    pub platform: Platform,
    pub suite: String,
    pub chunk: String,
}

/// Outcome of classifying a task name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    Coverage(TaskIdentity),
    NotCoverage,
}

impl Classification {
    pub fn identity(&self) -> Option<&TaskIdentity> {
        match self {
            Self::Coverage(identity) => Some(identity),
            Self::NotCoverage => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Build,
    Test,
}

/// A task name split into its segments.
#[derive(Debug)]
struct ParsedName<'a> {
    kind: Kind,
    /// `linux64-ccov`, `windows10-64-ccov`, `android-test-ccov`, `win64`...
    platform_segment: &'a str,
    /// Suite part with e10s tokens removed; empty for builds.
    chunk: String,
    e10s: bool,
}

impl<'a> ParsedName<'a> {
    fn parse(name: &'a str) -> Result<Self, ClassifyError> {
        let unrecognized = || ClassifyError::Unrecognized(name.to_string());

        let (head, tail) = name.split_once('/').ok_or_else(unrecognized)?;
        let (kind, platform_segment) = if let Some(rest) = head.strip_prefix("build-") {
            (Kind::Build, rest)
        } else if let Some(rest) = head.strip_prefix("test-") {
            (Kind::Test, rest)
        } else {
            return Err(unrecognized());
        };
        if platform_segment.is_empty() || tail.is_empty() {
            return Err(unrecognized());
        }

        let (chunk, e10s) = match kind {
            Kind::Build => (String::new(), false),
            Kind::Test => {
                // Drop the build type ("debug-", "opt-").
                let (_, suite) = tail.split_once('-').ok_or_else(unrecognized)?;
                let mut e10s = false;
                let parts: Vec<&str> = suite
                    .split('-')
                    .filter(|part| {
                        let is_e10s = *part == E10S_TOKEN;
                        e10s |= is_e10s;
                        !is_e10s
                    })
                    .collect();
                if parts.is_empty() || parts.iter().any(|part| part.is_empty()) {
                    return Err(unrecognized());
                }
                (parts.join("-"), e10s)
            }
        };

        Ok(Self {
            kind,
            platform_segment,
            chunk,
            e10s,
        })
    }

    fn is_coverage(&self) -> bool {
        has_coverage_token(self.platform_segment)
    }

    fn platform(&self) -> Option<Platform> {
        PLATFORM_TOKENS
            .iter()
            .find(|(token, _)| self.platform_segment.starts_with(*token))
            .map(|(_, platform)| *platform)
    }

    fn normalized_chunk(&self) -> &str {
        match self.kind {
            Kind::Build => BUILD_CHUNK,
            Kind::Test => &self.chunk,
        }
    }
}

/// Chunk and suite produced by a rule. Kept separate: some harnesses rename
/// the suite and the chunk differently.
struct SuiteChunk {
    chunk: String,
    suite: String,
}

/// A special case in the naming grammar: a predicate and the extractor used
/// when it matches.
struct Rule {
    matches: fn(&ParsedName<'_>) -> bool,
    extract: fn(&ParsedName<'_>) -> SuiteChunk,
}

/// Evaluated in order; the first matching rule wins.
const RULES: &[Rule] = &[
    Rule {
        matches: is_build,
        extract: build_chunk,
    },
    Rule {
        matches: is_chunked_e10s_mochitest,
        extract: mochitest_plain_chunked,
    },
    Rule {
        matches: is_cppunit,
        extract: cppunittest,
    },
    Rule {
        matches: is_test,
        extract: generic_chunk,
    },
];

fn is_build(name: &ParsedName<'_>) -> bool {
    name.kind == Kind::Build
}

fn is_test(name: &ParsedName<'_>) -> bool {
    name.kind == Kind::Test && !name.chunk.is_empty()
}

fn is_chunked_e10s_mochitest(name: &ParsedName<'_>) -> bool {
    name.e10s && matches!(split_chunk_index(&name.chunk), ("mochitest", Some(_)))
}

fn is_cppunit(name: &ParsedName<'_>) -> bool {
    name.chunk == "cppunit"
}

/// Builds share a single placeholder chunk.
fn build_chunk(_: &ParsedName<'_>) -> SuiteChunk {
    SuiteChunk {
        chunk: BUILD_CHUNK.to_string(),
        suite: BUILD_CHUNK.to_string(),
    }
}

fn mochitest_plain_chunked(name: &ParsedName<'_>) -> SuiteChunk {
    let (_, index) = split_chunk_index(&name.chunk);
    SuiteChunk {
        chunk: format!("mochitest-plain-chunked-{}", index.unwrap_or("1")),
        suite: "mochitest-plain-chunked".to_string(),
    }
}

/// cppunit is never chunked and reports under a different name.
fn cppunittest(_: &ParsedName<'_>) -> SuiteChunk {
    SuiteChunk {
        chunk: "cppunittest-1".to_string(),
        suite: "cppunittest".to_string(),
    }
}

/// Anything else keeps its name; unchunked suites get index 1.
fn generic_chunk(name: &ParsedName<'_>) -> SuiteChunk {
    match split_chunk_index(&name.chunk) {
        (suite, Some(_)) => SuiteChunk {
            chunk: name.chunk.clone(),
            suite: suite.to_string(),
        },
        (suite, None) => SuiteChunk {
            chunk: format!("{}-1", suite),
            suite: suite.to_string(),
        },
    }
}

fn apply_rules(name: &str) -> Result<SuiteChunk, ClassifyError> {
    let parsed = ParsedName::parse(name)?;
    RULES
        .iter()
        .find(|rule| (rule.matches)(&parsed))
        .map(|rule| (rule.extract)(&parsed))
        .ok_or_else(|| ClassifyError::Unrecognized(name.to_string()))
}

/// True if one `-`-separated token of `segment` is exactly `ccov`.
fn has_coverage_token(segment: &str) -> bool {
    segment.split('-').any(|token| token == COVERAGE_TOKEN)
}

/// Split `mochitest-7` into (`mochitest`, `Some("7")`).
fn split_chunk_index(chunk: &str) -> (&str, Option<&str>) {
    match chunk.rsplit_once('-') {
        Some((base, index))
            if !base.is_empty()
                && !index.is_empty()
                && index.bytes().all(|b| b.is_ascii_digit()) =>
        {
            (base, Some(index))
        }
        _ => (chunk, None),
    }
}

/// Returns true if the task is instrumented for code coverage.
///
/// Only the `kind-platform` head before the `/` is inspected, so a coverage
/// task with a malformed suite part is still reported as coverage. Names
/// without a `/` are not coverage tasks.
pub fn is_coverage_task(name: &str) -> bool {
    name.split_once('/')
        .map(|(head, _)| has_coverage_token(head))
        .unwrap_or(false)
}

/// Strip the `kind-platform/buildtype-` prefix and the e10s marker.
///
/// Build tasks collapse to `build`.
pub fn name_to_chunk(name: &str) -> Result<String, ClassifyError> {
    ParsedName::parse(name).map(|parsed| parsed.normalized_chunk().to_string())
}

/// Remove the trailing chunk index, if any.
pub fn chunk_to_suite(chunk: &str) -> &str {
    split_chunk_index(chunk).0
}

/// Chunk name as reported by the harness, with special cases applied.
pub fn get_chunk(name: &str) -> Result<String, ClassifyError> {
    apply_rules(name).map(|result| result.chunk)
}

/// Suite name as reported by the harness, with special cases applied.
pub fn get_suite(name: &str) -> Result<String, ClassifyError> {
    apply_rules(name).map(|result| result.suite)
}

pub fn get_platform(name: &str) -> Result<Platform, ClassifyError> {
    ParsedName::parse(name)?
        .platform()
        .ok_or_else(|| ClassifyError::Unrecognized(name.to_string()))
}

/// Full classification of a task name.
pub fn classify(name: &str) -> Result<Classification, ClassifyError> {
    let parsed = ParsedName::parse(name)?;
    if !parsed.is_coverage() {
        return Ok(Classification::NotCoverage);
    }

    let platform = parsed
        .platform()
        .ok_or_else(|| ClassifyError::Unrecognized(name.to_string()))?;
    let SuiteChunk { chunk, suite } = apply_rules(name)?;

    Ok(Classification::Coverage(TaskIdentity {
        platform,
        suite,
        chunk,
    }))
}

impl TaskDescriptor {
    pub fn is_coverage_task(&self) -> bool {
        is_coverage_task(self.name())
    }

    pub fn chunk(&self) -> Result<String, ClassifyError> {
        get_chunk(self.name())
    }

    pub fn suite(&self) -> Result<String, ClassifyError> {
        get_suite(self.name())
    }

    pub fn platform(&self) -> Result<Platform, ClassifyError> {
        get_platform(self.name())
    }

    pub fn classify(&self) -> Result<Classification, ClassifyError> {
        classify(self.name())
    }
}
