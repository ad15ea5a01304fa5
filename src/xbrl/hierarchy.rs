use std::collections::HashMap;

use crate::error::NormalizeError;

use super::types::{local_name, CalculationEdge};

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<usize>,
}

/// Parent-pointer forest over the filing's summation-item relationships.
///
/// Built fresh per filing and discarded afterwards; each filing defines its
/// own extension taxonomy, so hierarchies are never shared. Nodes live in a
/// flat arena with back-references only, which keeps ownership acyclic and
/// makes the cycle check a bounded walk.
#[derive(Debug, Default)]
pub struct ConceptHierarchy {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl ConceptHierarchy {
    /// Build the forest from calculation edges, recording child -> parent.
    /// Fails with `CycleDetected` if the input graph loops.
    pub fn from_edges(edges: &[CalculationEdge]) -> Result<Self, NormalizeError> {
        let mut hierarchy = ConceptHierarchy::default();

        for edge in edges {
            let parent = local_name(&edge.parent);
            let child = local_name(&edge.child);
            if parent.is_empty() || child.is_empty() {
                return Err(NormalizeError::RelationshipGraph(format!(
                    "calculation edge with empty concept reference: {:?} -> {:?}",
                    edge.parent, edge.child
                )));
            }

            let parent_ix = hierarchy.intern(parent);
            let child_ix = hierarchy.intern(child);
            hierarchy.nodes[child_ix].parent = Some(parent_ix);
        }

        hierarchy.check_acyclic()?;

        Ok(hierarchy)
    }

    fn intern(&mut self, name: &str) -> usize {
        if let Some(&ix) = self.index.get(name) {
            return ix;
        }
        let ix = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            parent: None,
        });
        self.index.insert(name.to_string(), ix);
        ix
    }

    fn check_acyclic(&self) -> Result<(), NormalizeError> {
        // A parent chain longer than the node count must revisit a node.
        let budget = self.nodes.len();
        for start in 0..self.nodes.len() {
            let mut current = start;
            let mut steps = 0;
            while let Some(parent) = self.nodes[current].parent {
                steps += 1;
                if steps > budget {
                    return Err(NormalizeError::CycleDetected(
                        self.nodes[start].name.clone(),
                    ));
                }
                current = parent;
            }
        }
        Ok(())
    }

    /// Direct parent of a concept, if one was recorded.
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        let ix = *self.index.get(name)?;
        let parent_ix = self.nodes[ix].parent?;
        Some(&self.nodes[parent_ix].name)
    }

    /// Walk parent pointers to the root. `None` if the concept was never
    /// registered; a concept with no parent edge is its own root.
    pub fn ultimate_parent(&self, name: &str) -> Option<&str> {
        let mut ix = *self.index.get(name)?;
        while let Some(parent) = self.nodes[ix].parent {
            ix = parent;
        }
        Some(&self.nodes[ix].name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
