//! Report configuration.
//!
//! Parameters can come from a TOML file, from command-line flags, or both.
//! Each source fills a [`ReportSettings`] of optional values; flags are
//! merged over the file and the result is resolved into a complete,
//! validated [`ReportConfig`].
//!
//! ```toml
//! exercise_value = 12.5
//! as_of = "2024-06-30"
//! print_schedule = true
//!
//! [interval]
//! type = "fixed_days"
//! days = 30
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vestlab_core::{IntervalStep, DATE_FORMAT};

const MISSING_EXERCISE_VALUE: &str = "exercise value is required";
const MISSING_AS_OF: &str = "as-of date is required";

/// Errors from loading or resolving report configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid report configuration:\n{}", format_problems(.0))]
    Invalid(Vec<String>),
}

fn format_problems(problems: &[String]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fully resolved parameters for one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Current exercise (fair-market) value per share.
    pub exercise_value: f64,
    /// Count tranches on or before this date.
    pub as_of: NaiveDate,
    /// Also render every grant's full schedule.
    pub print_schedule: bool,
    /// Date step between monthly tranches.
    pub interval: IntervalStep,
    /// Evaluate grants on the rayon pool.
    pub parallel: bool,
}

impl ReportConfig {
    pub fn new(exercise_value: f64, as_of: NaiveDate) -> Self {
        Self {
            exercise_value,
            as_of,
            print_schedule: false,
            interval: IntervalStep::default(),
            parallel: true,
        }
    }

    pub fn with_interval(mut self, interval: IntervalStep) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_schedules(mut self, print_schedule: bool) -> Self {
        self.print_schedule = print_schedule;
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.exercise_value.is_finite() || self.exercise_value < 0.0 {
            problems.push(format!(
                "exercise value must be a finite, non-negative number (got {})",
                self.exercise_value
            ));
        }
        if let IntervalStep::FixedDays { days: 0 } = self.interval {
            problems.push("interval must be at least one day".to_string());
        }
        problems
    }
}

/// Partially specified configuration from one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    pub exercise_value: Option<f64>,
    pub as_of: Option<NaiveDate>,
    pub print_schedule: Option<bool>,
    pub interval: Option<IntervalStep>,
    pub parallel: Option<bool>,
}

impl ReportSettings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Layer `overrides` on top of `self`; any value set in `overrides` wins.
    pub fn merge(self, overrides: ReportSettings) -> ReportSettings {
        ReportSettings {
            exercise_value: overrides.exercise_value.or(self.exercise_value),
            as_of: overrides.as_of.or(self.as_of),
            print_schedule: overrides.print_schedule.or(self.print_schedule),
            interval: overrides.interval.or(self.interval),
            parallel: overrides.parallel.or(self.parallel),
        }
    }

    /// Fill defaults and validate. Every missing or invalid parameter is
    /// reported in one error.
    pub fn resolve(self) -> Result<ReportConfig, ConfigError> {
        let mut problems = Vec::new();
        if self.exercise_value.is_none() {
            problems.push(MISSING_EXERCISE_VALUE.to_string());
        }
        if self.as_of.is_none() {
            problems.push(MISSING_AS_OF.to_string());
        }

        let (Some(exercise_value), Some(as_of)) = (self.exercise_value, self.as_of) else {
            return Err(ConfigError::Invalid(problems));
        };

        let config = ReportConfig {
            exercise_value,
            as_of,
            print_schedule: self.print_schedule.unwrap_or(false),
            interval: self.interval.unwrap_or_default(),
            parallel: self.parallel.unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolve, reporting `earlier` problems (found while reading flags)
    /// ahead of any from resolution itself.
    ///
    /// With `as_of_rejected` set, the as-of date was supplied but failed to
    /// parse; `earlier` already says so, and the generic missing-date
    /// message is dropped.
    pub fn resolve_with_problems(
        self,
        earlier: Vec<String>,
        as_of_rejected: bool,
    ) -> Result<ReportConfig, ConfigError> {
        let mut problems = earlier;
        match self.resolve() {
            Ok(config) if problems.is_empty() => Ok(config),
            Ok(_) => Err(ConfigError::Invalid(problems)),
            Err(ConfigError::Invalid(more)) => {
                problems.extend(
                    more.into_iter()
                        .filter(|p| !(as_of_rejected && p == MISSING_AS_OF)),
                );
                Err(ConfigError::Invalid(problems))
            }
            Err(e) => Err(e),
        }
    }
}

/// Parse a `YYYY-MM-DD` as-of date, describing the problem on failure.
pub fn parse_as_of(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| format!("invalid as-of date '{raw}': {e}. Use YYYY-MM-DD."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_full_toml() {
        let settings = ReportSettings::from_toml(
            r#"
exercise_value = 12.5
as_of = "2024-06-30"
print_schedule = true
parallel = false

[interval]
type = "fixed_days"
days = 30
"#,
        )
        .unwrap();

        let config = settings.resolve().unwrap();
        assert_eq!(config.exercise_value, 12.5);
        assert_eq!(config.as_of, date(2024, 6, 30));
        assert!(config.print_schedule);
        assert!(!config.parallel);
        assert_eq!(config.interval, IntervalStep::legacy());
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let config = ReportSettings::from_toml("exercise_value = 3.0\nas_of = \"2023-01-01\"\n")
            .unwrap()
            .resolve()
            .unwrap();
        assert!(!config.print_schedule);
        assert!(config.parallel);
        assert_eq!(config.interval, IntervalStep::CalendarMonth);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ReportSettings::from_toml("exercise = 3.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_win_over_file() {
        let file = ReportSettings {
            exercise_value: Some(1.0),
            as_of: Some(date(2020, 1, 1)),
            print_schedule: Some(true),
            ..Default::default()
        };
        let flags = ReportSettings {
            exercise_value: Some(9.0),
            interval: Some(IntervalStep::legacy()),
            ..Default::default()
        };

        let merged = file.merge(flags);
        assert_eq!(merged.exercise_value, Some(9.0));
        assert_eq!(merged.as_of, Some(date(2020, 1, 1)));
        assert_eq!(merged.print_schedule, Some(true));
        assert_eq!(merged.interval, Some(IntervalStep::legacy()));
    }

    #[test]
    fn missing_parameters_reported_together() {
        let err = ReportSettings::default().resolve().unwrap_err();
        match err {
            ConfigError::Invalid(problems) => {
                assert_eq!(problems.len(), 2);
                assert!(problems[0].contains("exercise value"));
                assert!(problems[1].contains("as-of date"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn problems_of(err: ConfigError) -> Vec<String> {
        match err {
            ConfigError::Invalid(problems) => problems,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_as_of_accepts_iso_dates_only() {
        assert_eq!(parse_as_of("2024-02-29"), Ok(date(2024, 2, 29)));
        let problem = parse_as_of("02/29/2024").unwrap_err();
        assert!(problem.contains("'02/29/2024'"));
        assert!(problem.contains("YYYY-MM-DD"));
    }

    #[test]
    fn malformed_as_of_replaces_missing_date_message() {
        let earlier = vec![parse_as_of("2024-13-01").unwrap_err()];
        let problems = problems_of(
            ReportSettings::default()
                .resolve_with_problems(earlier.clone(), true)
                .unwrap_err(),
        );
        assert_eq!(problems, vec![earlier[0].clone(), MISSING_EXERCISE_VALUE.to_string()]);
    }

    #[test]
    fn absent_as_of_still_reported_alongside_earlier_problems() {
        let problems = problems_of(
            ReportSettings {
                exercise_value: Some(1.0),
                ..Default::default()
            }
            .resolve_with_problems(vec!["bad flag".to_string()], false)
            .unwrap_err(),
        );
        assert_eq!(problems, vec!["bad flag".to_string(), MISSING_AS_OF.to_string()]);
    }

    #[test]
    fn earlier_problems_fail_an_otherwise_complete_config() {
        let settings = ReportSettings {
            exercise_value: Some(1.0),
            as_of: Some(date(2024, 1, 1)),
            ..Default::default()
        };
        let problems = problems_of(
            settings
                .clone()
                .resolve_with_problems(vec!["bad flag".to_string()], false)
                .unwrap_err(),
        );
        assert_eq!(problems, vec!["bad flag".to_string()]);

        assert!(settings.resolve_with_problems(Vec::new(), false).is_ok());
    }

    #[test]
    fn earlier_problems_precede_validation_failures() {
        let problems = problems_of(
            ReportSettings {
                exercise_value: Some(-2.0),
                as_of: Some(date(2024, 1, 1)),
                ..Default::default()
            }
            .resolve_with_problems(vec!["bad flag".to_string()], false)
            .unwrap_err(),
        );
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0], "bad flag");
        assert!(problems[1].contains("exercise value"));
    }

    #[test]
    fn rejects_negative_exercise_value() {
        let err = ReportConfig::new(-1.0, date(2024, 1, 1)).validate().unwrap_err();
        assert!(err.to_string().contains("exercise value"));
    }

    #[test]
    fn zero_exercise_value_is_allowed() {
        assert!(ReportConfig::new(0.0, date(2024, 1, 1)).validate().is_ok());
    }

    #[test]
    fn rejects_zero_day_interval() {
        let config = ReportConfig::new(1.0, date(2024, 1, 1))
            .with_interval(IntervalStep::FixedDays { days: 0 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        std::fs::write(&path, "as_of = \"2022-02-02\"\n").unwrap();

        let settings = ReportSettings::from_file(&path).unwrap();
        assert_eq!(settings.as_of, Some(date(2022, 2, 2)));
        assert_eq!(settings.exercise_value, None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ReportSettings::from_file(Path::new("/nonexistent/report.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
