//! npm-style version specifiers: classification, ordering and subset checks.
//!
//! Ranges are desugared into unions of intervals over [`semver::Version`]
//! (caret, tilde, x-ranges, hyphen ranges, comparator sets and `||`). The
//! npm rule that hides prereleases from ranges without a prerelease
//! comparator is not modeled; ranges are plain sets on the version line.

use std::cmp::Ordering;
use std::fmt;

use semver::{BuildMetadata, Prerelease, Version};

/// Sentinel token meaning "whatever the registry tags as latest".
pub const LATEST: &str = "latest";
/// Sentinel token meaning "the local workspace copy".
pub const WORKSPACE_ANY: &str = "workspace:*";

/// How a specifier string was understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecKind {
    /// A single full version such as `1.2.3`.
    Exact(Version),
    /// Any other parsable range expression.
    Range,
    /// `latest` or `workspace:*`.
    Sentinel,
    /// Anything else: tags, protocols, URLs, garbage.
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Bound {
    Unbounded,
    Inclusive(Version),
    Exclusive(Version),
}

impl Bound {
    fn point(&self) -> Option<(&Version, bool)> {
        match self {
            Bound::Unbounded => None,
            Bound::Inclusive(v) => Some((v, true)),
            Bound::Exclusive(v) => Some((v, false)),
        }
    }
}

/// Orders lower bounds: an inclusive bound starts before an exclusive one
/// on the same version.
fn cmp_lower(a: &Bound, b: &Bound) -> Ordering {
    match (a.point(), b.point()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some((av, ai)), Some((bv, bi))) => av.cmp(bv).then_with(|| bi.cmp(&ai)),
    }
}

/// Orders upper bounds: an exclusive bound ends before an inclusive one on
/// the same version.
fn cmp_upper(a: &Bound, b: &Bound) -> Ordering {
    match (a.point(), b.point()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some((av, ai)), Some((bv, bi))) => av.cmp(bv).then_with(|| ai.cmp(&bi)),
    }
}

fn floor(major: u64, minor: u64, patch: u64) -> Version {
    Version {
        major,
        minor,
        patch,
        pre: Prerelease::new("0").unwrap_or(Prerelease::EMPTY),
        build: BuildMetadata::EMPTY,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    lower: Bound,
    upper: Bound,
}

impl Interval {
    fn any() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    fn nothing() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Exclusive(floor(0, 0, 0)),
        }
    }

    fn point(version: Version) -> Self {
        Self {
            lower: Bound::Inclusive(version.clone()),
            upper: Bound::Inclusive(version),
        }
    }

    fn between(lower: Bound, upper: Bound) -> Self {
        Self { lower, upper }
    }

    fn is_empty(&self) -> bool {
        match (self.lower.point(), self.upper.point()) {
            (Some((lv, li)), Some((uv, ui))) => lv > uv || (lv == uv && !(li && ui)),
            (None, Some((uv, false))) => *uv == floor(0, 0, 0),
            _ => false,
        }
    }

    fn intersect(&self, other: &Interval) -> Interval {
        let lower = if cmp_lower(&self.lower, &other.lower) == Ordering::Less {
            other.lower.clone()
        } else {
            self.lower.clone()
        };
        let upper = if cmp_upper(&self.upper, &other.upper) == Ordering::Greater {
            other.upper.clone()
        } else {
            self.upper.clone()
        };
        Interval { lower, upper }
    }

    fn contains(&self, inner: &Interval) -> bool {
        cmp_lower(&self.lower, &inner.lower) != Ordering::Greater
            && cmp_upper(&inner.upper, &self.upper) != Ordering::Greater
    }

    fn admits(&self, version: &Version) -> bool {
        let above = match &self.lower {
            Bound::Unbounded => true,
            Bound::Inclusive(v) => version >= v,
            Bound::Exclusive(v) => version > v,
        };
        let below = match &self.upper {
            Bound::Unbounded => true,
            Bound::Inclusive(v) => version <= v,
            Bound::Exclusive(v) => version < v,
        };
        above && below
    }

    fn min_version(&self) -> Option<Version> {
        let candidate = match &self.lower {
            Bound::Unbounded => {
                let zero = Version::new(0, 0, 0);
                if self.admits(&zero) {
                    zero
                } else {
                    floor(0, 0, 0)
                }
            }
            Bound::Inclusive(v) => v.clone(),
            Bound::Exclusive(v) if v.pre.is_empty() => {
                Version::new(v.major, v.minor, v.patch.checked_add(1)?)
            }
            Bound::Exclusive(v) => {
                let mut next = v.clone();
                next.pre = Prerelease::new(&format!("{}.0", v.pre)).ok()?;
                next
            }
        };
        self.admits(&candidate).then_some(candidate)
    }
}

/// Whether two sorted neighbours leave no version uncovered between them.
fn touches(upper: &Bound, lower: &Bound) -> bool {
    match (upper.point(), lower.point()) {
        (None, _) | (_, None) => true,
        (Some((uv, ui)), Some((lv, li))) => match lv.cmp(uv) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => ui || li,
        },
    }
}

fn normalize(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(|i| !i.is_empty());
    intervals.sort_by(|a, b| {
        cmp_lower(&a.lower, &b.lower).then_with(|| cmp_upper(&a.upper, &b.upper))
    });

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for next in intervals {
        match merged.last_mut() {
            Some(last) if touches(&last.upper, &next.lower) => {
                if cmp_upper(&next.upper, &last.upper) == Ordering::Greater {
                    last.upper = next.upper;
                }
            }
            _ => merged.push(next),
        }
    }
    merged
}

/// Lexicographic order on normalized interval lists in which a strict
/// subset always sorts first.
fn cmp_intervals(a: &[Interval], b: &[Interval]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = cmp_lower(&y.lower, &x.lower).then_with(|| cmp_upper(&x.upper, &y.upper));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// A version with possibly missing trailing components (`1`, `1.2`, `1.x`).
#[derive(Debug, Clone)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

fn parse_component(part: &str) -> Option<Option<u64>> {
    match part {
        "x" | "X" | "*" => Some(None),
        digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse().ok().map(Some)
        }
        _ => None,
    }
}

fn parse_partial(input: &str) -> Option<Partial> {
    let input = input.trim_start_matches(|c: char| matches!(c, 'v' | 'V' | '='));
    if input.is_empty() {
        return None;
    }

    let (main, build) = match input.split_once('+') {
        Some((main, build)) => (main, Some(build)),
        None => (input, None),
    };
    if let Some(build) = build {
        BuildMetadata::new(build).ok()?;
    }
    let (core, pre) = match main.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (main, None),
    };

    let mut parts = core.split('.');
    let major = parse_component(parts.next()?)?;
    let minor = match parts.next() {
        Some(part) => parse_component(part)?,
        None => None,
    };
    let patch = match parts.next() {
        Some(part) => parse_component(part)?,
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }

    // Anything after a wildcard is a wildcard too.
    let minor = major.and(minor);
    let patch = minor.and(patch);

    let pre = match pre {
        Some(pre) if patch.is_some() => Prerelease::new(pre).ok()?,
        Some(_) => return None,
        None => Prerelease::EMPTY,
    };

    Some(Partial {
        major,
        minor,
        patch,
        pre,
    })
}

impl Partial {
    fn full(&self) -> Option<Version> {
        Some(Version {
            major: self.major?,
            minor: self.minor?,
            patch: self.patch?,
            pre: self.pre.clone(),
            build: BuildMetadata::EMPTY,
        })
    }

    /// Lowest version the partial covers, ignoring wildcards.
    fn base(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
            build: BuildMetadata::EMPTY,
        }
    }

    /// First release past the span a partial covers (`1.2` -> `1.3.0`).
    fn past_span(&self) -> Option<(u64, u64, u64)> {
        let major = self.major?;
        match self.minor {
            None => Some((major.checked_add(1)?, 0, 0)),
            Some(minor) if self.patch.is_none() => Some((major, minor.checked_add(1)?, 0)),
            Some(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Tilde,
    Caret,
    Gt,
    Gte,
    Lt,
    Lte,
}

fn split_operator(token: &str) -> (Op, &str) {
    const OPERATORS: [(&str, Op); 8] = [
        ("~>", Op::Tilde),
        ("~", Op::Tilde),
        ("^", Op::Caret),
        (">=", Op::Gte),
        ("<=", Op::Lte),
        (">", Op::Gt),
        ("<", Op::Lt),
        ("=", Op::Eq),
    ];
    for (prefix, op) in OPERATORS {
        if let Some(rest) = token.strip_prefix(prefix) {
            return (op, rest.trim_start());
        }
    }
    (Op::Eq, token)
}

fn is_operator(token: &str) -> bool {
    matches!(token, "~>" | "~" | "^" | ">=" | "<=" | ">" | "<" | "=")
}

fn desugar(op: Op, p: &Partial) -> Option<Interval> {
    let Some(major) = p.major else {
        return Some(match op {
            Op::Gt | Op::Lt => Interval::nothing(),
            _ => Interval::any(),
        });
    };

    let interval = match op {
        Op::Eq => match p.full() {
            Some(v) => Interval::point(v),
            None => {
                let (a, b, c) = p.past_span()?;
                Interval::between(Bound::Inclusive(p.base()), Bound::Exclusive(floor(a, b, c)))
            }
        },
        Op::Tilde => {
            let upper = match p.minor {
                Some(minor) => floor(major, minor.checked_add(1)?, 0),
                None => floor(major.checked_add(1)?, 0, 0),
            };
            Interval::between(Bound::Inclusive(p.base()), Bound::Exclusive(upper))
        }
        Op::Caret => {
            let upper = match (major, p.minor, p.patch) {
                (0, None, _) => floor(1, 0, 0),
                (0, Some(0), None) => floor(0, 1, 0),
                (0, Some(0), Some(patch)) => floor(0, 0, patch.checked_add(1)?),
                (0, Some(minor), _) => floor(0, minor.checked_add(1)?, 0),
                (major, _, _) => floor(major.checked_add(1)?, 0, 0),
            };
            Interval::between(Bound::Inclusive(p.base()), Bound::Exclusive(upper))
        }
        Op::Gt => match p.full() {
            Some(v) => Interval::between(Bound::Exclusive(v), Bound::Unbounded),
            None => {
                let (a, b, c) = p.past_span()?;
                Interval::between(Bound::Inclusive(Version::new(a, b, c)), Bound::Unbounded)
            }
        },
        Op::Gte => Interval::between(Bound::Inclusive(p.base()), Bound::Unbounded),
        Op::Lt => match p.full() {
            Some(v) => Interval::between(Bound::Unbounded, Bound::Exclusive(v)),
            None => {
                let base = p.base();
                Interval::between(
                    Bound::Unbounded,
                    Bound::Exclusive(floor(base.major, base.minor, base.patch)),
                )
            }
        },
        Op::Lte => match p.full() {
            Some(v) => Interval::between(Bound::Unbounded, Bound::Inclusive(v)),
            None => {
                let (a, b, c) = p.past_span()?;
                Interval::between(Bound::Unbounded, Bound::Exclusive(floor(a, b, c)))
            }
        },
    };
    Some(interval)
}

fn parse_hyphen(lower: &str, upper: &str) -> Option<Interval> {
    let lower = parse_partial(lower)?;
    let upper = parse_partial(upper)?;

    let lower_bound = match lower.major {
        None => Bound::Unbounded,
        Some(_) => Bound::Inclusive(lower.base()),
    };
    let upper_bound = match (upper.major, upper.full()) {
        (None, _) => Bound::Unbounded,
        (Some(_), Some(v)) => Bound::Inclusive(v),
        (Some(_), None) => {
            let (a, b, c) = upper.past_span()?;
            Bound::Exclusive(floor(a, b, c))
        }
    };
    Some(Interval::between(lower_bound, upper_bound))
}

fn parse_comparator_set(input: &str) -> Option<Interval> {
    if input.is_empty() {
        return Some(Interval::any());
    }

    if let Some((lower, upper)) = input.split_once(" - ") {
        let (lower, upper) = (lower.trim(), upper.trim());
        if lower.contains(char::is_whitespace) || upper.contains(char::is_whitespace) {
            return None;
        }
        return parse_hyphen(lower, upper);
    }

    let mut tokens: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;
    for word in input.split_whitespace() {
        if is_operator(word) {
            if pending_op.is_some() {
                return None;
            }
            pending_op = Some(word);
            continue;
        }
        match pending_op.take() {
            Some(op) => tokens.push(format!("{}{}", op, word)),
            None => tokens.push(word.to_string()),
        }
    }
    if pending_op.is_some() {
        return None;
    }

    let mut result = Interval::any();
    for token in &tokens {
        let (op, rest) = split_operator(token);
        let partial = parse_partial(rest)?;
        result = result.intersect(&desugar(op, &partial)?);
    }
    Some(result)
}

fn parse_range(input: &str) -> Option<Vec<Interval>> {
    input
        .split("||")
        .map(|alternative| parse_comparator_set(alternative.trim()))
        .collect::<Option<Vec<_>>>()
        .map(normalize)
}

fn parse_exact(input: &str) -> Option<Version> {
    parse_partial(input)?.full()
}

/// A classified version specifier as it appears in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    raw: String,
    kind: SpecKind,
    intervals: Vec<Interval>,
}

impl VersionSpec {
    /// Classifies `raw`. Never fails: unrecognized input becomes
    /// [`SpecKind::Invalid`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (kind, intervals) = if trimmed == LATEST || trimmed == WORKSPACE_ANY {
            (SpecKind::Sentinel, Vec::new())
        } else if let Some(version) = parse_exact(trimmed) {
            (SpecKind::Exact(version.clone()), vec![Interval::point(version)])
        } else if let Some(intervals) = parse_range(trimmed) {
            (SpecKind::Range, intervals)
        } else {
            (SpecKind::Invalid, Vec::new())
        };

        Self {
            raw: raw.to_string(),
            kind,
            intervals,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &SpecKind {
        &self.kind
    }

    pub fn is_sentinel(&self) -> bool {
        self.kind == SpecKind::Sentinel
    }

    /// Exact versions and ranges.
    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, SpecKind::Exact(_) | SpecKind::Range)
    }

    /// Lowest release the specifier admits, as npm's `minVersion` computes it.
    pub fn min_version(&self) -> Option<Version> {
        if !self.is_concrete() {
            return None;
        }
        self.intervals.iter().filter_map(Interval::min_version).min()
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.is_concrete() && self.intervals.iter().any(|i| i.admits(version))
    }

    /// Whether every version `self` admits is also admitted by `other`.
    ///
    /// Identical strings are always subsets of each other. Sentinels are only
    /// subsets of sentinels, and unparsable specifiers only of themselves.
    pub fn is_subset_of(&self, other: &VersionSpec) -> bool {
        if self.raw == other.raw {
            return true;
        }
        match (&self.kind, &other.kind) {
            (SpecKind::Sentinel, SpecKind::Sentinel) => true,
            (SpecKind::Sentinel | SpecKind::Invalid, _)
            | (_, SpecKind::Sentinel | SpecKind::Invalid) => false,
            _ => self
                .intervals
                .iter()
                .all(|inner| other.intervals.iter().any(|outer| outer.contains(inner))),
        }
    }

    fn rank(&self) -> u8 {
        match self.kind {
            SpecKind::Invalid => 0,
            SpecKind::Exact(_) | SpecKind::Range => 1,
            SpecKind::Sentinel => 2,
        }
    }
}

impl Ord for VersionSpec {
    /// Unparsable specifiers first, sentinels last. Concrete specifiers
    /// order by minimum version; on equal minima the narrower one comes
    /// first. Remaining ties fall back to the raw string.
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| {
                if !self.is_concrete() {
                    return Ordering::Equal;
                }
                self.min_version()
                    .cmp(&other.min_version())
                    .then_with(|| {
                        match (self.is_subset_of(other), other.is_subset_of(self)) {
                            (true, false) => Ordering::Less,
                            (false, true) => Ordering::Greater,
                            _ => cmp_intervals(&self.intervals, &other.intervals),
                        }
                    })
            })
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for VersionSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

pub fn compare(a: &str, b: &str) -> Ordering {
    VersionSpec::parse(a).cmp(&VersionSpec::parse(b))
}

pub fn is_subset(candidate: &str, reference: &str) -> bool {
    VersionSpec::parse(candidate).is_subset_of(&VersionSpec::parse(reference))
}

pub fn min_version(spec: &str) -> Option<Version> {
    VersionSpec::parse(spec).min_version()
}

/// Sorts specifiers ascending. Equal strings are kept as given.
pub fn sort_versions<I, S>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut specs: Vec<VersionSpec> = versions
        .into_iter()
        .map(|v| VersionSpec::parse(v.as_ref()))
        .collect();
    specs.sort();
    specs.into_iter().map(|s| s.raw).collect()
}

/// The lowest-ordered candidate that `current` already fits inside, i.e. a
/// version the project can adopt without narrowing what it accepts today.
pub fn recommended_version<S: AsRef<str>>(current: &str, candidates: &[S]) -> Option<String> {
    let current = VersionSpec::parse(current);
    sort_versions(candidates)
        .into_iter()
        .find(|candidate| current.is_subset_of(&VersionSpec::parse(candidate)))
}
