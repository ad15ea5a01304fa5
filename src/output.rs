use anyhow::Result;
use std::fs::OpenOptions;
use std::path::Path;

use crate::xbrl::NormalizedFact;

const HEADER: [&str; 16] = [
    "period_end",
    "lei",
    "statement_category",
    "xml_name",
    "wider_anchor_or_xml_name",
    "wider_anchor",
    "xml_name_parent",
    "value",
    "currency",
    "is_extension",
    "is_total",
    "has_resolved_group",
    "statement_item_group",
    "membership",
    "legal_name",
    "label",
];

/// Append-only CSV sink for normalized records. The sink owns the file
/// handle, so concurrent producers must funnel their batches through one
/// sink instance; appends are serialized by ownership.
pub struct CsvSink {
    writer: csv::Writer<std::fs::File>,
}

impl CsvSink {
    /// Open `path` for appending, writing the header only when the file
    /// is new or empty.
    pub fn append(path: &Path, separator: u8) -> Result<Self> {
        let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(separator)
            .from_writer(file);

        if is_new {
            writer.write_record(HEADER)?;
        }

        Ok(CsvSink { writer })
    }

    pub fn write_records(&mut self, records: &[NormalizedFact]) -> Result<()> {
        for record in records {
            self.writer.write_record([
                record.period_end.format("%Y-%m-%d").to_string(),
                record.lei.clone(),
                record
                    .statement_category
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                record.xml_name.clone(),
                record.wider_anchor_or_xml_name.clone(),
                record.wider_anchor.clone().unwrap_or_default(),
                record.xml_name_parent.clone().unwrap_or_default(),
                record.value.to_string(),
                record.currency.clone(),
                record.is_extension.to_string(),
                record.is_total.to_string(),
                record.has_resolved_group.to_string(),
                record.statement_item_group.clone().unwrap_or_default(),
                record.membership.clone().unwrap_or_default(),
                record.legal_name.clone().unwrap_or_default(),
                record.label.clone().unwrap_or_default(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
