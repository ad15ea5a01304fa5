pub mod anchor;
pub mod classify;
pub mod coerce;
pub mod hierarchy;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use classify::{StatementCategory, StatementClassifier};
pub use pipeline::{clean_records, process_filing, ProcessedFiling};
pub use types::{FactValue, FilingData, NormalizedFact, RawFact};
