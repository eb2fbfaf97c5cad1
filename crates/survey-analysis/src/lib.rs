//! Statistics core of the survey pipeline.
//!
//! Works on [`survey_frame::Table`] values and never modifies them. Every
//! operation returns a typed result record or an [`AnalysisError`]; callers
//! decide whether a failed step stops the run.
//!
//! # Overview
//!
//! 1. **Classify** ([`classify`], [`schema`]): numeric, ordinal or nominal
//!    columns, with a configurable ordinal vocabulary
//! 2. **Correlate** ([`correlation`]): Pearson, Spearman or Cramér's V picked
//!    from the column kinds
//! 3. **Compare groups** ([`groups`], [`anova`]): group summaries and one-way ANOVA
//! 4. **Planned contrasts** ([`contrast`]): zero-sum weights tested as a
//!    linear hypothesis on the group means
//! 5. **Gate** ([`significance`]): decide what is worth plotting
//!
//! [`exploration`] holds the descriptive summaries shown before testing.
//!
//! # Examples
//!
//! ```
//! use survey_analysis::{
//!     anova::one_way_anova,
//!     contrast::{build_contrast, evaluate_contrast},
//!     significance::SignificanceGate,
//! };
//! use survey_frame::{Column, Table};
//!
//! let table = Table::new(vec![
//!     Column::from_labels("Diet", ["Vegan", "Vegan", "Vegan", "Keto", "Keto", "Keto", "Paleo", "Paleo", "Paleo"]),
//!     Column::from_values("Happiness", [8.0, 9.0, 8.5, 4.0, 5.0, 4.5, 6.0, 6.5, 6.0]),
//! ])
//! .unwrap();
//!
//! let gate = SignificanceGate::default();
//! let anova = one_way_anova(&table, "Diet", "Happiness").unwrap();
//! assert!(gate.check(anova.p_value));
//!
//! let weights = build_contrast(&["Vegan"], &["Keto", "Paleo"]).unwrap();
//! let contrast = evaluate_contrast(&table, "Diet", "Happiness", &weights).unwrap();
//! assert!(contrast.t_statistic > 0.0);
//! ```

pub use self::error::AnalysisError;

pub mod anova;
pub mod classify;
pub mod contrast;
pub mod correlation;
mod error;
pub mod exploration;
pub mod groups;
pub mod schema;
pub mod significance;
