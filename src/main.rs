use anyhow::{Context, Result};
use log::{info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use structopt::StructOpt;

use esef_normalizer::core::config::NormalizerConfig;
use esef_normalizer::output::CsvSink;
use esef_normalizer::utils::retry::with_retry;
use esef_normalizer::xbrl::{clean_records, process_filing, FilingData, NormalizedFact};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "esef-normalizer",
    about = "Normalize XBRL toolkit fact exports into a comparable CSV of statement line items"
)]
struct Opt {
    /// Directory with one JSON filing export per file
    #[structopt(short, long, parse(from_os_str))]
    input_dir: Option<PathBuf>,

    /// CSV file to append records to
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Keep only records with a period-end year strictly after this
    #[structopt(long)]
    cutoff_year: Option<i32>,
}

fn filing_files(input_dir: &PathBuf) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .with_context(|| format!("unable to read input directory {}", input_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    files.sort();
    Ok(files)
}

fn main() -> Result<()> {
    env_logger::init();

    let opt = Opt::from_args();
    let mut config = NormalizerConfig::from_env()?;
    if let Some(input_dir) = opt.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output) = opt.output {
        config.output_path = output;
    }
    if let Some(cutoff_year) = opt.cutoff_year {
        config.cutoff_year = cutoff_year;
    }

    let start_time = Instant::now();
    let files = filing_files(&config.input_dir)?;

    let mut records: Vec<NormalizedFact> = Vec::new();
    let mut parsed_files = 0usize;
    let mut skipped_facts = 0usize;

    for path in &files {
        info!("Working on {}", path.display());

        let content = with_retry(3, Duration::from_millis(500), || {
            std::fs::read_to_string(path)
        });
        let content = match content {
            Ok(content) => content,
            Err(err) => {
                warn!("unable to read {}: {}", path.display(), err);
                continue;
            }
        };

        let filing: FilingData = match serde_json::from_str(&content) {
            Ok(filing) => filing,
            Err(err) => {
                warn!("unable to decode {}: {}", path.display(), err);
                continue;
            }
        };

        // A filing-fatal error excludes the whole filing from output.
        match process_filing(&filing) {
            Ok(processed) => {
                records.extend(processed.records);
                skipped_facts += processed.skipped_facts;
                parsed_files += 1;
            }
            Err(err) => {
                warn!("excluding filing {}: {}", path.display(), err);
            }
        }
    }

    let cleaned = clean_records(records, config.cutoff_year);

    let mut sink = CsvSink::append(&config.output_path, config.csv_separator)?;
    sink.write_records(&cleaned)?;

    info!(
        "Parsed {}/{} files in {}s: {} records written, {} facts skipped",
        parsed_files,
        files.len(),
        start_time.elapsed().as_secs(),
        cleaned.len(),
        skipped_facts
    );

    Ok(())
}
