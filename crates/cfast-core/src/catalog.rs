//! Built-in test catalog.
//!
//! Every test the crate ships is described in `catalog.toml`, embedded at
//! compile time. The catalog supplies display text and default timings and
//! builds a ready-to-run [`TrialSession`] for a test code.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::error::ConfigError;
use crate::generator::ProblemGenerator;
use crate::harness::HarnessConfig;
use crate::session::TrialSession;
use crate::tasks::{
    angles_bearings, auditory_capacity, instrument_comprehension, numerical_operations,
};

/// Whether a test deals discrete problems or runs a continuous simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Discrete,
    Continuous,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Discrete => "discrete",
            Self::Continuous => "continuous",
        };
        f.write_str(s)
    }
}

impl FromStr for TestKind {
    type Err = TestKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discrete" => Ok(Self::Discrete),
            "continuous" => Ok(Self::Continuous),
            other => Err(TestKindParseError(other.to_string())),
        }
    }
}

/// Error returned when parsing an invalid [`TestKind`] string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid test kind: {0:?}")]
pub struct TestKindParseError(pub String);

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    /// Stable test code, e.g. `numerical_operations`.
    pub code: String,
    pub title: String,
    /// Bumped whenever scoring or generation changes meaning.
    pub version: u32,
    pub kind: TestKind,
    /// Practice question count for discrete tests.
    #[serde(default)]
    pub practice_questions: u32,
    /// Practice length in seconds for continuous tests.
    #[serde(default)]
    pub practice_duration_s: f64,
    pub scored_duration_s: f64,
    pub input_hint: String,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Errors from catalog lookup and session construction.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown test code: {0}")]
    UnknownTest(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tests: Vec<CatalogEntry>,
}

/// Test entries keyed by code, in code order.
#[derive(Clone, Default)]
pub struct TestCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl TestCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog document. Later entries replace earlier ones with
    /// the same code.
    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(s)?;
        let mut catalog = Self::new();
        for entry in file.tests {
            catalog.insert(entry);
        }
        Ok(catalog)
    }

    /// Insert an entry, returning the one it replaced.
    pub fn insert(&mut self, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(entry.code.clone(), entry)
    }

    pub fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.get(code)
    }

    /// Entries sorted by code.
    pub fn list(&self) -> Vec<&CatalogEntry> {
        self.entries.values().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TestCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCatalog")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

static CATALOG_TOML: &str = include_str!("catalog.toml");

static BUILTIN: LazyLock<TestCatalog> = LazyLock::new(|| {
    TestCatalog::from_toml_str(CATALOG_TOML).expect("embedded catalog.toml is invalid")
});

/// The embedded catalog.
///
/// # Panics
///
/// Panics on first use if the embedded TOML is malformed. The file ships
/// inside the binary, so a successful build with passing tests rules this
/// out.
pub fn builtin() -> &'static TestCatalog {
    &BUILTIN
}

// ---------------------------------------------------------------------------
// Session construction
// ---------------------------------------------------------------------------

/// Per-attempt overrides. `None` keeps the catalog default.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub seed: u64,
    pub difficulty: f64,
    /// Practice questions (discrete) or practice seconds (continuous).
    pub practice: Option<u32>,
    pub scored_duration_s: Option<f64>,
}

impl SessionOptions {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            difficulty: 0.5,
            practice: None,
            scored_duration_s: None,
        }
    }
}

/// Build a fresh session for `code` from the built-in catalog.
pub fn build(
    code: &str,
    clock: Rc<dyn Clock>,
    opts: &SessionOptions,
) -> Result<Box<dyn TrialSession>, CatalogError> {
    let entry = builtin()
        .get(code)
        .ok_or_else(|| CatalogError::UnknownTest(code.to_string()))?;
    let scored_duration_s = opts.scored_duration_s.unwrap_or(entry.scored_duration_s);
    debug!(
        code,
        seed = opts.seed,
        difficulty = opts.difficulty,
        scored_duration_s,
        "building session"
    );

    if entry.kind == TestKind::Continuous {
        let config = auditory_capacity::AuditoryCapacityConfig {
            practice_duration_s: opts
                .practice
                .map_or(entry.practice_duration_s, f64::from),
            scored_duration_s,
            ..Default::default()
        };
        let engine = auditory_capacity::build_auditory_capacity_test(
            clock,
            opts.seed,
            opts.difficulty,
            config,
        )?;
        return Ok(Box::new(engine));
    }

    let config = HarnessConfig::new(opts.seed, scored_duration_s)
        .difficulty(opts.difficulty)
        .practice_questions(opts.practice.unwrap_or(entry.practice_questions));
    let session: Box<dyn TrialSession> = match code {
        numerical_operations::CODE => Box::new(
            numerical_operations::build_numerical_operations_test(clock, config)?,
        ),
        angles_bearings::CODE => {
            Box::new(angles_bearings::build_angles_bearings_test(clock, config)?)
        }
        instrument_comprehension::CODE => Box::new(
            instrument_comprehension::build_instrument_comprehension_test(clock, config)?,
        ),
        other => return Err(CatalogError::UnknownTest(other.to_string())),
    };
    Ok(session)
}

/// A second generator seeded like the one inside the session for `code`.
///
/// Because generators are pure functions of their seed and call sequence,
/// drawing from the mirror in lockstep reproduces every dealt problem.
/// Continuous tests have no generator and return `None`.
pub fn mirror_generator(
    code: &str,
    seed: u64,
) -> Result<Option<Box<dyn ProblemGenerator>>, CatalogError> {
    let generator: Box<dyn ProblemGenerator> = match code {
        numerical_operations::CODE => {
            Box::new(numerical_operations::NumericalOperationsGenerator::new(seed))
        }
        angles_bearings::CODE => Box::new(angles_bearings::AnglesBearingsGenerator::new(seed)),
        instrument_comprehension::CODE => {
            Box::new(instrument_comprehension::InstrumentGenerator::new(seed))
        }
        auditory_capacity::CODE => return Ok(None),
        other => return Err(CatalogError::UnknownTest(other.to_string())),
    };
    Ok(Some(generator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::phase::Phase;

    #[test]
    fn builtin_catalog_has_every_task() {
        let catalog = builtin();
        assert_eq!(catalog.len(), 4);
        let codes: Vec<&str> = catalog.list().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                "angles_bearings_degrees",
                "auditory_capacity",
                "instrument_comprehension",
                "numerical_operations",
            ]
        );
        let auditory = catalog.get("auditory_capacity").unwrap();
        assert_eq!(auditory.kind, TestKind::Continuous);
        assert_eq!(auditory.practice_duration_s, 60.0);
        assert_eq!(auditory.scored_duration_s, 780.0);
        assert_eq!(catalog.get("numerical_operations").unwrap().practice_questions, 5);
    }

    #[test]
    fn later_entries_replace_earlier() {
        let toml = r#"
            [[tests]]
            code = "x"
            title = "First"
            version = 1
            kind = "discrete"
            scored_duration_s = 10.0
            input_hint = ""

            [[tests]]
            code = "x"
            title = "Second"
            version = 2
            kind = "discrete"
            scored_duration_s = 10.0
            input_hint = ""
        "#;
        let catalog = TestCatalog::from_toml_str(toml).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("x").unwrap().title, "Second");
        assert!(catalog.get("x").unwrap().instructions.is_empty());
    }

    #[test]
    fn malformed_catalog_is_a_parse_error() {
        let err = TestCatalog::from_toml_str("tests = 3").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_kind_round_trips_through_strings() {
        assert_eq!("continuous".parse::<TestKind>().unwrap(), TestKind::Continuous);
        assert_eq!(TestKind::Discrete.to_string(), "discrete");
        assert!("timed".parse::<TestKind>().is_err());
    }

    #[test]
    fn build_applies_overrides() {
        let clock = ManualClock::new();
        let mut opts = SessionOptions::new(7);
        opts.practice = Some(0);
        opts.scored_duration_s = Some(2.0);

        let mut s = build("numerical_operations", Rc::new(clock.clone()), &opts).unwrap();
        assert_eq!(s.title(), "Numerical Operations");
        s.start_practice();
        assert_eq!(s.phase(), Phase::PracticeDone);
        s.start_scored();
        assert_eq!(s.time_remaining_s(), Some(2.0));
        assert_eq!(s.attempt_meta().practice_questions, 0);
    }

    #[test]
    fn build_rejects_unknown_and_invalid() {
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::new());
        let opts = SessionOptions::new(1);
        assert!(matches!(
            build("nope", clock.clone(), &opts),
            Err(CatalogError::UnknownTest(_))
        ));

        let mut bad = SessionOptions::new(1);
        bad.difficulty = 2.0;
        assert!(matches!(
            build("auditory_capacity", clock, &bad),
            Err(CatalogError::Config(ConfigError::InvalidDifficulty(_)))
        ));
    }

    #[test]
    fn mirror_reproduces_dealt_problems() {
        let mut mirror = mirror_generator("angles_bearings_degrees", 11).unwrap().unwrap();
        let mut direct = angles_bearings::AnglesBearingsGenerator::new(11);
        for _ in 0..10 {
            assert_eq!(mirror.next_problem(0.4), direct.next_problem(0.4));
        }
        assert!(mirror_generator("auditory_capacity", 1).unwrap().is_none());
        assert!(mirror_generator("nope", 1).is_err());
    }
}
