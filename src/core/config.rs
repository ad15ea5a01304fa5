use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Default comparability floor: only records with a period-end year
/// strictly after this survive cleaning.
pub const DEFAULT_CUTOFF_YEAR: i32 = 2020;

pub const DEFAULT_CSV_SEPARATOR: u8 = b'|';

#[derive(Clone, Debug)]
pub struct NormalizerConfig {
    /// Directory holding one JSON filing export per file.
    pub input_dir: PathBuf,
    /// CSV file appended to across runs.
    pub output_path: PathBuf,
    pub cutoff_year: i32,
    pub csv_separator: u8,
}

impl NormalizerConfig {
    pub fn from_env() -> Result<Self> {
        let input_dir = PathBuf::from(
            std::env::var("ESEF_INPUT_DIR").unwrap_or_else(|_| "filings".to_string()),
        );

        let output_path = PathBuf::from(
            std::env::var("ESEF_OUTPUT_PATH").unwrap_or_else(|_| "output.csv".to_string()),
        );

        let cutoff_year = match std::env::var("ESEF_CUTOFF_YEAR") {
            Ok(raw) => raw
                .parse::<i32>()
                .map_err(|_| anyhow!("ESEF_CUTOFF_YEAR is not a valid year: {raw}"))?,
            Err(_) => DEFAULT_CUTOFF_YEAR,
        };

        Ok(Self {
            input_dir,
            output_path,
            cutoff_year,
            csv_separator: DEFAULT_CSV_SEPARATOR,
        })
    }
}
