//! Freshness conditions and their evaluation.
//!
//! A [`ConditionSet`] maps a condition kind to a value. Supported kinds:
//!
//! - `max-age` / `maxage`: seconds; the entry must be younger than this.
//!   Zero or negative means the entry is always stale.
//! - `younger-than` / `youngerthan`: one path or a list of paths; the entry
//!   must not be older than any of them. `http://` and `https://` references
//!   are assumed satisfied. A missing local reference makes the entry stale.
//!
//! Kinds are kept as plain strings until evaluation, so an unknown kind is
//! reported by whichever operation first evaluates it.

use chrono::Duration;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use super::clock::Clock;
use super::fs::Filesystem;
use crate::error::{CacheError, Result};

/// References that cannot be checked locally.
static REMOTE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("REMOTE_REFERENCE must compile"));

/// Canonical spelling of the max-age condition.
pub const MAX_AGE: &str = "max-age";

/// Canonical spelling of the younger-than condition.
pub const YOUNGER_THAN: &str = "younger-than";

/// The value side of a condition entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// A duration in seconds.
    Seconds(i64),
    /// A single reference path.
    Path(String),
    /// Several reference paths.
    Paths(Vec<String>),
}

impl From<i64> for ConditionValue {
    fn from(seconds: i64) -> Self {
        Self::Seconds(seconds)
    }
}

impl From<i32> for ConditionValue {
    fn from(seconds: i32) -> Self {
        Self::Seconds(seconds.into())
    }
}

impl From<&str> for ConditionValue {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<String>> for ConditionValue {
    fn from(paths: Vec<String>) -> Self {
        Self::Paths(paths)
    }
}

/// A set of freshness conditions, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet {
    entries: BTreeMap<String, ConditionValue>,
}

impl ConditionSet {
    /// An empty set: existence alone decides freshness.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the condition `kind`.
    pub fn with(mut self, kind: impl Into<String>, value: impl Into<ConditionValue>) -> Self {
        self.insert(kind, value);
        self
    }

    /// Require the entry to be younger than `seconds`.
    pub fn max_age(self, seconds: i64) -> Self {
        self.with(MAX_AGE, seconds)
    }

    /// Require the entry to be no older than `path`.
    ///
    /// Calling this again adds another reference instead of replacing it.
    pub fn younger_than(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        let value = match self.entries.remove(YOUNGER_THAN) {
            Some(ConditionValue::Path(existing)) => ConditionValue::Paths(vec![existing, path]),
            Some(ConditionValue::Paths(mut existing)) => {
                existing.push(path);
                ConditionValue::Paths(existing)
            }
            _ => ConditionValue::Path(path),
        };
        self.entries.insert(YOUNGER_THAN.to_string(), value);
        self
    }

    /// Add or replace the condition `kind`.
    pub fn insert(&mut self, kind: impl Into<String>, value: impl Into<ConditionValue>) {
        self.entries.insert(kind.into(), value.into());
    }

    /// Whether no conditions are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The value stored for `kind`, exactly as spelled.
    pub fn get(&self, kind: &str) -> Option<&ConditionValue> {
        self.entries.get(kind)
    }

    /// Lay `self` over `defaults`; entries in `self` win on the same kind.
    pub fn merged_over(&self, defaults: &ConditionSet) -> ConditionSet {
        let mut entries = defaults.entries.clone();
        entries.extend(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        ConditionSet { entries }
    }

    /// Check every entry and turn it into a typed [`Condition`].
    pub fn parse(&self) -> Result<Vec<Condition>> {
        self.entries
            .iter()
            .map(|(kind, value)| Condition::parse(kind, value))
            .collect()
    }
}

/// A validated freshness condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Entry must be younger than this many seconds.
    MaxAge(i64),
    /// Entry must be at least as new as every reference.
    YoungerThan(Vec<String>),
}

impl Condition {
    /// Interpret one `kind: value` pair.
    pub fn parse(kind: &str, value: &ConditionValue) -> Result<Self> {
        match kind {
            "max-age" | "maxage" => match value {
                ConditionValue::Seconds(secs) => Ok(Self::MaxAge(*secs)),
                ConditionValue::Path(raw) => raw.trim().parse().map(Self::MaxAge).map_err(|_| {
                    CacheError::InvalidConditionValue {
                        kind: kind.to_string(),
                        message: format!("expected a number of seconds, got '{}'", raw),
                    }
                }),
                ConditionValue::Paths(_) => Err(CacheError::InvalidConditionValue {
                    kind: kind.to_string(),
                    message: "expected a number of seconds, got a list".to_string(),
                }),
            },
            "younger-than" | "youngerthan" => match value {
                ConditionValue::Path(path) => Ok(Self::YoungerThan(vec![path.clone()])),
                ConditionValue::Paths(paths) => Ok(Self::YoungerThan(paths.clone())),
                ConditionValue::Seconds(secs) => Err(CacheError::InvalidConditionValue {
                    kind: kind.to_string(),
                    message: format!("expected a path, got the number {}", secs),
                }),
            },
            other => Err(CacheError::UnsupportedCondition {
                kind: other.to_string(),
            }),
        }
    }
}

/// Whether `reference` points at something only reachable over the network.
pub fn is_remote_reference(reference: &str) -> bool {
    REMOTE_REFERENCE.is_match(reference)
}

/// Decides whether a cache entry is still usable.
pub struct ConditionEvaluator<'a> {
    fs: &'a dyn Filesystem,
    clock: &'a dyn Clock,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(fs: &'a dyn Filesystem, clock: &'a dyn Clock) -> Self {
        Self { fs, clock }
    }

    /// Whether the entry at `entry` exists and satisfies every condition.
    ///
    /// Conditions are validated before the existence check, so a bad
    /// condition is reported even when the entry is missing.
    pub fn is_fresh(&self, entry: &Path, conditions: &ConditionSet) -> Result<bool> {
        let conditions = conditions.parse()?;

        if !self.fs.is_file(entry) {
            return Ok(false);
        }

        for condition in &conditions {
            if !self.check(entry, condition)? {
                tracing::debug!("Cache entry {:?} failed {:?}", entry, condition);
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn check(&self, entry: &Path, condition: &Condition) -> Result<bool> {
        match condition {
            Condition::MaxAge(secs) => {
                if *secs <= 0 {
                    return Ok(false);
                }
                // Beyond the representable range there is no age limit.
                let Some(limit) = Duration::try_seconds(*secs) else {
                    return Ok(true);
                };
                let age = self.clock.now() - self.fs.modified_time(entry)?;
                Ok(age < limit)
            }
            Condition::YoungerThan(references) => {
                let entry_time = self.fs.modified_time(entry)?;
                for reference in references {
                    if is_remote_reference(reference) {
                        continue;
                    }
                    let reference = Path::new(reference);
                    if !self.fs.exists(reference) {
                        return Ok(false);
                    }
                    if entry_time < self.fs.modified_time(reference)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::fs::OsFilesystem;
    use std::fs::File;
    use std::time::{Duration as StdDuration, SystemTime};
    use tempfile::TempDir;

    fn touch(path: &Path, at: SystemTime) {
        std::fs::write(path, b"x").unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(at)
            .unwrap();
    }

    #[test]
    fn parse_accepts_both_spellings() {
        let set = ConditionSet::new()
            .with("maxage", 10)
            .with("youngerthan", "/tmp/ref");
        let parsed = set.parse().unwrap();
        assert!(parsed.contains(&Condition::MaxAge(10)));
        assert!(parsed.contains(&Condition::YoungerThan(vec!["/tmp/ref".into()])));
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let set = ConditionSet::new().with("bogus", 1);
        let err = set.parse().unwrap_err();
        assert!(matches!(err, CacheError::UnsupportedCondition { kind } if kind == "bogus"));
    }

    #[test]
    fn parse_rejects_wrong_value_shape() {
        let err = ConditionSet::new().with("max-age", "soon").parse().unwrap_err();
        assert!(matches!(err, CacheError::InvalidConditionValue { .. }));

        let err = ConditionSet::new()
            .with("younger-than", 5)
            .parse()
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidConditionValue { .. }));
    }

    #[test]
    fn max_age_accepts_numeric_strings() {
        let parsed = ConditionSet::new().with("max-age", "60").parse().unwrap();
        assert_eq!(parsed, vec![Condition::MaxAge(60)]);
    }

    #[test]
    fn younger_than_accumulates_references() {
        let set = ConditionSet::new().younger_than("a").younger_than("b");
        assert_eq!(
            set.get(YOUNGER_THAN),
            Some(&ConditionValue::Paths(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn per_call_conditions_override_defaults() {
        let defaults = ConditionSet::new().max_age(86400).younger_than("ref");
        let call = ConditionSet::new().max_age(10);

        let merged = call.merged_over(&defaults);
        assert_eq!(merged.get(MAX_AGE), Some(&ConditionValue::Seconds(10)));
        assert_eq!(merged.get(YOUNGER_THAN), Some(&ConditionValue::from("ref")));
    }

    #[test]
    fn remote_references() {
        assert!(is_remote_reference("http://example.com/a"));
        assert!(is_remote_reference("https://example.com/a"));
        assert!(!is_remote_reference("ftp://example.com/a"));
        assert!(!is_remote_reference("/var/http://x"));
    }

    #[test]
    fn deserializes_from_yaml() {
        let yaml = "max-age: 60\nyounger-than:\n  - a.txt\n  - https://example.com\n";
        let set: ConditionSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(set.get(MAX_AGE), Some(&ConditionValue::Seconds(60)));
        assert_eq!(
            set.get(YOUNGER_THAN),
            Some(&ConditionValue::Paths(vec![
                "a.txt".into(),
                "https://example.com".into()
            ]))
        );
    }

    #[test]
    fn missing_entry_is_never_fresh() {
        let temp = TempDir::new().unwrap();
        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);

        let fresh = evaluator
            .is_fresh(&temp.path().join("nope"), &ConditionSet::new())
            .unwrap();
        assert!(!fresh);
    }

    #[test]
    fn unknown_kind_fails_even_for_missing_entry() {
        let temp = TempDir::new().unwrap();
        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);

        let result = evaluator.is_fresh(
            &temp.path().join("nope"),
            &ConditionSet::new().with("bogus", 1),
        );
        assert!(matches!(
            result,
            Err(CacheError::UnsupportedCondition { .. })
        ));
    }

    #[test]
    fn max_age_expires_with_clock() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("a.txt");
        std::fs::write(&entry, b"c").unwrap();

        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);
        let conditions = ConditionSet::new().max_age(60);

        assert!(evaluator.is_fresh(&entry, &conditions).unwrap());
        clock.advance(Duration::seconds(61));
        assert!(!evaluator.is_fresh(&entry, &conditions).unwrap());
    }

    #[test]
    fn non_positive_max_age_is_always_stale() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("a.txt");
        std::fs::write(&entry, b"c").unwrap();

        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);

        assert!(!evaluator
            .is_fresh(&entry, &ConditionSet::new().max_age(0))
            .unwrap());
        assert!(!evaluator
            .is_fresh(&entry, &ConditionSet::new().max_age(-1))
            .unwrap());
    }

    #[test]
    fn huge_max_age_never_expires() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("a.txt");
        std::fs::write(&entry, b"c").unwrap();

        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);

        for secs in [i64::MAX, i64::MAX / 1000 + 1] {
            assert!(evaluator
                .is_fresh(&entry, &ConditionSet::new().max_age(secs))
                .unwrap());
        }
    }

    #[test]
    fn directory_is_not_an_entry() {
        let temp = TempDir::new().unwrap();
        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);

        assert!(!evaluator
            .is_fresh(temp.path(), &ConditionSet::new())
            .unwrap());
    }

    #[test]
    fn younger_than_compares_modification_times() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("a.txt");
        let reference = temp.path().join("source.txt");
        let now = SystemTime::now();

        touch(&reference, now - StdDuration::from_secs(100));
        touch(&entry, now);

        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);
        let conditions = ConditionSet::new().younger_than(reference.to_string_lossy());

        assert!(evaluator.is_fresh(&entry, &conditions).unwrap());

        touch(&reference, now + StdDuration::from_secs(100));
        assert!(!evaluator.is_fresh(&entry, &conditions).unwrap());
    }

    #[test]
    fn younger_than_same_time_is_fresh() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("a.txt");
        let reference = temp.path().join("source.txt");
        let at = SystemTime::now() - StdDuration::from_secs(10);

        touch(&reference, at);
        touch(&entry, at);

        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);
        let conditions = ConditionSet::new().younger_than(reference.to_string_lossy());

        assert!(evaluator.is_fresh(&entry, &conditions).unwrap());
    }

    #[test]
    fn younger_than_missing_reference_is_stale() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("a.txt");
        std::fs::write(&entry, b"c").unwrap();

        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);
        let conditions =
            ConditionSet::new().younger_than(temp.path().join("gone").to_string_lossy());

        assert!(!evaluator.is_fresh(&entry, &conditions).unwrap());
    }

    #[test]
    fn younger_than_remote_reference_is_assumed_fresh() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("a.txt");
        std::fs::write(&entry, b"c").unwrap();

        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);
        let conditions = ConditionSet::new()
            .younger_than("https://example.com/style.css")
            .younger_than("http://example.com/app.js");

        assert!(evaluator.is_fresh(&entry, &conditions).unwrap());
    }

    #[test]
    fn all_conditions_must_pass() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("a.txt");
        std::fs::write(&entry, b"c").unwrap();

        let clock = ManualClock::starting_now();
        let evaluator = ConditionEvaluator::new(&OsFilesystem, &clock);
        let conditions = ConditionSet::new()
            .max_age(60)
            .younger_than(temp.path().join("gone").to_string_lossy());

        assert!(!evaluator.is_fresh(&entry, &conditions).unwrap());
    }
}
