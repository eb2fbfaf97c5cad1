//! Synthetic survey data with built-in effects.
//!
//! Exercise raises happiness and sleep, stress lowers sleep, social
//! interaction and happiness, and diet shifts happiness. The analysis
//! pipeline should find these effects on a few hundred rows.

use std::path::PathBuf;

use anyhow::{Context, ensure};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, StandardNormal};
use rand_pcg::Pcg64;
use survey_frame::{Column, Table, loader};
use tracing::info;

use crate::util::Output;

const COUNTRIES: &[&str] = &[
    "USA", "UK", "Canada", "Australia", "Germany", "India", "Japan", "Brazil",
];
const GENDERS: &[&str] = &["Male", "Female", "Other"];
/// Shared by exercise and stress; position is the level's effect size.
const LEVELS: &[&str] = &["Low", "Moderate", "High"];
const DIETS: &[(&str, f64)] = &[
    ("Balanced", 0.6),
    ("Vegan", 0.4),
    ("Vegetarian", 0.3),
    ("Keto", 0.0),
    ("Junk Food", -0.8),
];
const CONDITIONS: &[&str] = &["None", "Anxiety", "Depression", "Bipolar", "PTSD"];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateSampleArg {
    /// Number of participants
    #[arg(long, default_value_t = 500)]
    pub rows: usize,
    /// Random seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Share of cells left blank in the columns that allow it
    #[arg(long, default_value_t = 0.02)]
    pub missing_rate: f64,
    /// CSV destination, stdout when omitted
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn pick<'a, R: Rng>(rng: &mut R, values: &[&'a str]) -> &'a str {
    values[rng.random_range(0..values.len())]
}

fn noisy<R: Rng>(rng: &mut R, mean: f64, std_dev: f64, min: f64, max: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    let value = (mean + std_dev * z).clamp(min, max);
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Default)]
struct Columns {
    country: Vec<Option<String>>,
    age: Vec<Option<f64>>,
    gender: Vec<Option<String>>,
    exercise: Vec<Option<String>>,
    diet: Vec<Option<String>>,
    sleep: Vec<Option<f64>>,
    stress: Vec<Option<String>>,
    condition: Vec<Option<String>>,
    work_hours: Vec<Option<f64>>,
    screen_time: Vec<Option<f64>>,
    social: Vec<Option<f64>>,
    happiness: Vec<Option<f64>>,
}

#[expect(clippy::cast_precision_loss)]
fn generate(rows: usize, seed: u64, missing_rate: f64) -> anyhow::Result<Table> {
    ensure!(
        (0.0..1.0).contains(&missing_rate),
        "missing rate must be in [0, 1), got {missing_rate}"
    );
    let mut rng = Pcg64::seed_from_u64(seed);
    let work_hours = Normal::new(40.0_f64, 8.0).context("Invalid work hours distribution")?;
    let screen_time = Normal::new(6.0_f64, 2.0).context("Invalid screen time distribution")?;

    let mut c = Columns::default();
    for _ in 0..rows {
        let exercise = rng.random_range(0..LEVELS.len());
        let stress = rng.random_range(0..LEVELS.len());
        let (diet, diet_effect) = DIETS[rng.random_range(0..DIETS.len())];
        let (exercise_effect, stress_effect) = (exercise as f64, stress as f64);

        let sleep = noisy(
            &mut rng,
            6.5 + 0.4 * exercise_effect - 0.5 * stress_effect,
            0.8,
            3.0,
            11.0,
        );
        let social = noisy(&mut rng, 6.5 - 0.8 * stress_effect, 1.8, 1.0, 10.0);
        let happiness = noisy(
            &mut rng,
            5.0 + 0.9 * exercise_effect + diet_effect - 0.5 * stress_effect,
            1.2,
            1.0,
            10.0,
        );

        c.country.push(Some(pick(&mut rng, COUNTRIES).to_owned()));
        c.age.push(Some(f64::from(rng.random_range(18..65_u8))));
        c.gender.push(Some(pick(&mut rng, GENDERS).to_owned()));
        c.exercise.push(Some(LEVELS[exercise].to_owned()));
        c.diet.push(Some(diet.to_owned()));
        c.stress.push(Some(LEVELS[stress].to_owned()));
        c.condition.push(
            (!rng.random_bool(missing_rate)).then(|| pick(&mut rng, CONDITIONS).to_owned()),
        );
        c.sleep.push((!rng.random_bool(missing_rate)).then_some(sleep));
        c.work_hours
            .push(Some(work_hours.sample(&mut rng).clamp(10.0, 80.0).round()));
        c.screen_time.push(
            (!rng.random_bool(missing_rate))
                .then(|| (screen_time.sample(&mut rng).clamp(0.5, 16.0) * 10.0).round() / 10.0),
        );
        c.social.push(Some(social));
        c.happiness.push(Some(happiness));
    }

    let table = Table::new(vec![
        Column::text("Country", c.country),
        Column::numeric("Age", c.age),
        Column::text("Gender", c.gender),
        Column::text("Exercise Level", c.exercise),
        Column::text("Diet Type", c.diet),
        Column::numeric("Sleep Hours", c.sleep),
        Column::text("Stress Level", c.stress),
        Column::text("Mental Health Condition", c.condition),
        Column::numeric("Work Hours per Week", c.work_hours),
        Column::numeric("Screen Time per Day (Hours)", c.screen_time),
        Column::numeric("Social Interaction Score", c.social),
        Column::numeric("Happiness Score", c.happiness),
    ])?;
    Ok(table)
}

pub(crate) fn run(arg: &GenerateSampleArg) -> anyhow::Result<()> {
    let table = generate(arg.rows, arg.seed, arg.missing_rate)?;
    let mut output = Output::from_output_path(arg.output.as_deref())?;
    loader::write_csv(&table, &mut output)
        .with_context(|| format!("Failed to write sample CSV to {}", output.display_path()))?;
    output.finish()?;
    info!(
        rows = table.n_rows(),
        seed = arg.seed,
        output = %output.display_path(),
        "sample survey generated"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use survey_analysis::{anova::one_way_anova, correlation::CorrelationEngine};

    use super::*;

    #[test]
    fn test_same_seed_same_data() {
        assert_eq!(generate(50, 7, 0.1).unwrap(), generate(50, 7, 0.1).unwrap());
        assert_ne!(generate(50, 7, 0.1).unwrap(), generate(50, 8, 0.1).unwrap());
    }

    #[test]
    fn test_shape_and_types() {
        let table = generate(120, 1, 0.0).unwrap();
        assert_eq!(table.n_rows(), 120);
        assert_eq!(table.n_cols(), 12);
        assert!(table.column("Sleep Hours").unwrap().is_numeric());
        assert!(!table.column("Stress Level").unwrap().is_numeric());
        assert_eq!(table.column("Sleep Hours").unwrap().missing_count(), 0);
    }

    #[test]
    fn test_effects_are_detectable() {
        let table = generate(600, 42, 0.0).unwrap();
        let anova = one_way_anova(&table, "Exercise Level", "Happiness Score").unwrap();
        assert!(anova.p_value < 0.001);

        let engine = CorrelationEngine::default();
        let result = engine
            .correlate(
                table.column("Stress Level").unwrap(),
                table.column("Sleep Hours").unwrap(),
            )
            .unwrap();
        assert!(result.coefficient < -0.2);
        assert!(result.p_value < 0.001);
    }

    #[test]
    fn test_rejects_bad_missing_rate() {
        assert!(generate(10, 1, 1.5).is_err());
    }
}
