//! The activity-data pipeline: ingestion, validation, cleaning, CO2e
//! derivation and analysis.

pub mod analysis;
pub mod calculator;
pub mod cleaning;
pub mod flows;
pub mod io;
pub mod naming;
pub mod sample;
pub mod types;
pub mod validation;

pub use analysis::{simulate_reduction, summary_by_activity, top_emitters, total_emissions};
pub use calculator::compute;
pub use cleaning::clean;
pub use flows::{PipelineOutcome, run_pipeline};
pub use io::{Source, SourceFormat, load};
pub use sample::{sample_dataset, write_sample_csv};
pub use types::{
    ActivitySummary, Dataset, DerivedDataset, EXTENDED_COLUMNS, FieldKind, FieldMissing,
    NoMatchWarning, REQUIRED_COLUMNS, Record, Simulation, ValidationReport,
};
pub use validation::validate;
