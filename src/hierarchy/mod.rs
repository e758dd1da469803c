//! The ontology DAG: a dense, index-based view supporting O(1)
//! parent/child/ancestor/descendant lookups (spec.md C1).
mod edge;
mod slim;

pub use edge::{GraphEdge, Relationship};
pub use slim::SlimOntology;
