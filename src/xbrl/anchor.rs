use std::collections::HashMap;

use crate::error::NormalizeError;

use super::types::{local_name, AnchorEdge};

/// One-level map from filer-defined ("narrower") concept names to the
/// standard ("wider") concepts they are anchored to. Per-filing lifetime,
/// like the concept hierarchy.
#[derive(Debug, Default)]
pub struct AnchorMap {
    map: HashMap<String, String>,
}

impl AnchorMap {
    /// Build from wider-narrower edges; the first mapping seen per
    /// narrower concept wins.
    pub fn from_edges(edges: &[AnchorEdge]) -> Result<Self, NormalizeError> {
        let mut map: HashMap<String, String> = HashMap::new();

        for edge in edges {
            let narrower = local_name(&edge.narrower);
            let wider = local_name(&edge.wider);
            if narrower.is_empty() || wider.is_empty() {
                return Err(NormalizeError::RelationshipGraph(format!(
                    "anchor edge with empty concept reference: {:?} -> {:?}",
                    edge.wider, edge.narrower
                )));
            }
            map.entry(narrower.to_string())
                .or_insert_with(|| wider.to_string());
        }

        Ok(AnchorMap { map })
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// The anchored wider name, or the concept's own name when no anchor
    /// exists. Never empty for a non-empty input.
    pub fn resolve_or_own<'a>(&'a self, name: &'a str) -> &'a str {
        self.resolve(name).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
