//! The list of recommended imports for using the library.
pub use crate::annotation::{AnnotationTable, RawAnnotation};
pub use crate::bitset::BitSet;
pub use crate::config::{BoqaConfig, InheritanceVariant};
pub use crate::engine::Boqa;
pub use crate::error::{BoqaError, Result};
pub use crate::hierarchy::{GraphEdge, Relationship, SlimOntology};
pub use crate::inference::CancellationToken;
pub use crate::io::{AnnotationSource, InMemoryAnnotations, InMemoryOntology, OntologySource};
pub use crate::item_index::ItemIndex;
pub use crate::query::RankedItem;
pub use crate::term::{AltTermIdAware, SimpleTerm, Term};
pub use crate::term_id::{Identified, TermId};
