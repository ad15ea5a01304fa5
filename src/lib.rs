pub mod core;
pub mod error;
pub mod output;
pub mod utils;
pub mod xbrl;

// Re-exports
pub use error::NormalizeError;
pub use xbrl::{clean_records, process_filing, FilingData, NormalizedFact};
