use chrono::Datelike;
use log::{debug, info, warn};
use std::collections::HashMap;

use crate::error::NormalizeError;

use super::anchor::AnchorMap;
use super::classify::StatementClassifier;
use super::hierarchy::ConceptHierarchy;
use super::normalize::{legal_name, normalize_fact, FilingContext};
use super::types::{clean_linkrole, local_name, CalculationEdge, FilingData, NormalizedFact};

/// Records of one successfully processed filing, plus the number of facts
/// skipped over value-parse failures (for auditing).
#[derive(Debug, Default)]
pub struct ProcessedFiling {
    pub records: Vec<NormalizedFact>,
    pub skipped_facts: usize,
}

/// Concept local name -> cleaned link role, derived from the calculation
/// graph. Used when the toolkit did not attach a role to a fact directly;
/// the first role seen per concept wins.
pub fn concept_role_map(edges: &[CalculationEdge]) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();

    for edge in edges {
        let Some(role) = edge.role.as_deref() else {
            continue;
        };
        let child = local_name(&edge.child);
        map.entry(child.to_string())
            .or_insert_with(|| clean_linkrole(role).to_string());
    }

    map
}

/// Process one filing: build the per-filing relationship state, then run
/// every fact through coercion, classification and normalization in
/// document order.
///
/// Relationship-graph problems (including calculation cycles) are
/// filing-fatal and yield an error: the filing contributes no records at
/// all. A single fact's value-parse failure is skipped and counted.
pub fn process_filing(filing: &FilingData) -> Result<ProcessedFiling, NormalizeError> {
    let hierarchy = ConceptHierarchy::from_edges(&filing.calculation_edges)?;
    let anchors = AnchorMap::from_edges(&filing.anchor_edges)?;
    let classifier = StatementClassifier::for_filing(&filing.roles);
    let concept_roles = concept_role_map(&filing.calculation_edges);

    let entity_name = legal_name(&filing.facts);
    info!(
        "Entity: {}",
        entity_name.as_deref().unwrap_or("<unknown>")
    );

    let ctx = FilingContext {
        hierarchy: &hierarchy,
        anchors: &anchors,
        classifier: &classifier,
        concept_roles: &concept_roles,
        legal_name: entity_name.as_deref(),
    };

    let mut processed = ProcessedFiling::default();

    for (sort_key, fact) in filing.facts.iter().enumerate() {
        match normalize_fact(fact, sort_key, &ctx) {
            Ok(Some(record)) => processed.records.push(record),
            Ok(None) => debug!("dropping fact {} without usable value", fact.qname()),
            Err(err) if err.is_filing_fatal() => return Err(err),
            Err(err) => {
                warn!("skipping fact: {}", err);
                processed.skipped_facts += 1;
            }
        }
    }

    Ok(processed)
}

/// Dedup & clean pass over a (possibly multi-filing) record batch. Order
/// matters for numerical correctness: zero and opening-balance records
/// must go before deduplication so they cannot shadow real values.
///
/// Idempotent: running it on its own output removes nothing further.
pub fn clean_records(records: Vec<NormalizedFact>, cutoff_year: i32) -> Vec<NormalizedFact> {
    let mut deduped: HashMap<(String, String, String, String, String, String), NormalizedFact> =
        HashMap::new();

    for record in records {
        // Zero values carry no comparative information and would dominate
        // dedup collisions.
        if record.value.is_zero() {
            continue;
        }
        // January 1st period ends are opening-balance duplicates of the
        // prior period's closing balance.
        if record.period_end.month() == 1 && record.period_end.day() == 1 {
            continue;
        }
        if record.period_end.year() <= cutoff_year {
            continue;
        }

        let key = (
            record.lei.clone(),
            record.period_end.to_string(),
            record.wider_anchor_or_xml_name.clone(),
            record.xml_name.clone(),
            record
                .statement_category
                .map(|c| c.to_string())
                .unwrap_or_default(),
            record.value.to_string(),
        );
        // Last-seen wins: later extraction passes are more authoritative.
        deduped.insert(key, record);
    }

    let mut cleaned: Vec<NormalizedFact> = deduped.into_values().collect();
    cleaned.sort_by(|a, b| {
        (&a.lei, a.period_end, a.sort_key).cmp(&(&b.lei, b.period_end, b.sort_key))
    });
    cleaned
}
