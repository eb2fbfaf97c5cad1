//! Analysis plan for the `run` command.
//!
//! Every field has a default, so a config file only needs to list what it
//! changes. The defaults reproduce the mental-health survey study.

use std::path::Path;

use anyhow::ensure;
use serde::Deserialize;
use survey_analysis::{schema::OrdinalSchema, significance::DEFAULT_ALPHA};
use survey_frame::{cleaning::CleaningOptions, loader::LoadOptions};

use crate::util;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CorrelationSpec {
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnovaSpec {
    pub group: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContrastSpec {
    pub group: String,
    pub value: String,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub alpha: f64,
    pub load: LoadOptions,
    pub cleaning: CleaningOptions,
    pub ordinal_levels: OrdinalSchema,
    /// Rows shown in the overview.
    pub head_rows: usize,
    pub top_n: usize,
    pub add_other: bool,
    pub histogram_bins: usize,
    pub correlations: Vec<CorrelationSpec>,
    pub anovas: Vec<AnovaSpec>,
    pub contrasts: Vec<ContrastSpec>,
}

fn pair(a: &str, b: &str) -> CorrelationSpec {
    CorrelationSpec {
        a: a.to_owned(),
        b: b.to_owned(),
    }
}

fn labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|&s| s.to_owned()).collect()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            load: LoadOptions::default(),
            cleaning: CleaningOptions::default(),
            ordinal_levels: OrdinalSchema::default(),
            head_rows: 5,
            top_n: 10,
            add_other: false,
            histogram_bins: 10,
            correlations: vec![
                pair("Stress Level", "Sleep Hours"),
                pair("Age", "Sleep Hours"),
                pair("Social Interaction Score", "Stress Level"),
                pair("Age", "Social Interaction Score"),
            ],
            anovas: vec![
                AnovaSpec {
                    group: "Diet Type".to_owned(),
                    value: "Happiness Score".to_owned(),
                },
                AnovaSpec {
                    group: "Exercise Level".to_owned(),
                    value: "Sleep Hours".to_owned(),
                },
            ],
            contrasts: vec![
                ContrastSpec {
                    group: "Exercise Level".to_owned(),
                    value: "Happiness Score".to_owned(),
                    positive: labels(&["High"]),
                    negative: labels(&["Low"]),
                },
                ContrastSpec {
                    group: "Diet Type".to_owned(),
                    value: "Happiness Score".to_owned(),
                    positive: labels(&["Balanced", "Vegan", "Vegetarian"]),
                    negative: labels(&["Junk Food"]),
                },
            ],
        }
    }
}

impl AnalysisConfig {
    /// Reads a config file, or returns the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config: Self = match path {
            Some(path) => util::read_json_file("analysis config", path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.alpha > 0.0 && self.alpha < 1.0,
            "alpha must be in (0, 1), got {}",
            self.alpha
        );
        if let Some(z) = self.cleaning.z_threshold {
            ensure!(z > 0.0, "z threshold must be positive, got {z}");
        }
        ensure!(self.top_n > 0, "top_n must be positive");
        ensure!(self.histogram_bins > 0, "histogram_bins must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_defaults_cover_the_survey_study() {
        let config = AnalysisConfig::load(None).unwrap();
        assert!((config.alpha - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.correlations.len(), 4);
        assert_eq!(config.correlations[0], pair("Stress Level", "Sleep Hours"));
        assert_eq!(config.cleaning.z_threshold, Some(3.0));
        assert_eq!(config.ordinal_levels.levels(), ["Low", "Moderate", "High"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        fs::write(
            &path,
            r#"{
                "alpha": 0.01,
                "ordinal_levels": ["Never", "Sometimes", "Often"],
                "cleaning": { "z_threshold": null },
                "correlations": [{ "a": "Age", "b": "Happiness Score" }],
                "contrasts": []
            }"#,
        )
        .unwrap();
        let config = AnalysisConfig::load(Some(&path)).unwrap();
        assert!((config.alpha - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.ordinal_levels.rank("Often"), Some(3.0));
        assert_eq!(config.cleaning.z_threshold, None);
        assert!(config.cleaning.impute_missing);
        assert_eq!(config.correlations, vec![pair("Age", "Happiness Score")]);
        assert!(config.contrasts.is_empty());
        assert_eq!(config.anovas.len(), 2);
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn test_rejects_invalid_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        fs::write(&path, r#"{ "alpha": 1.5 }"#).unwrap();
        let err = AnalysisConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("alpha"));
    }
}
