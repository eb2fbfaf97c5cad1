//! In-memory survey tables: the column model, the CSV loader and the
//! cleaning transforms applied before any analysis.
//!
//! # Examples
//!
//! ```
//! use survey_frame::{cleaning, loader::{LoadOptions, read_csv}};
//!
//! let data = "Age,City\n20,NY\n,LA\n40, \n";
//! let table = read_csv(data.as_bytes(), &LoadOptions::default()).unwrap();
//! let outcome = cleaning::handle_missing_values(&table);
//! assert_eq!(outcome.table.n_rows(), 2);
//! ```

pub use self::{
    error::FrameError,
    model::{Cell, CellKey, Column, ColumnData, Table},
};

pub mod cleaning;
mod error;
pub mod loader;
mod model;
