//! The errors used by the library.
use thiserror::Error;

/// The error type returned by BOQA's public operations.
///
/// Setup errors (`InvalidOntology`, `InvalidAnnotations`) abort
/// construction of the engine. Query errors (`UnknownTerm`,
/// `EmptyQuery`, `Cancelled`) are returned from `score()` without
/// poisoning the engine. `NumericFault` conditions encountered during
/// scoring are logged and skipped rather than raised — see
/// `case::get_node_case`.
#[derive(Error, Debug)]
pub enum BoqaError {
    /// The ontology source contains a cycle, has no root, or otherwise
    /// cannot be assembled into a [`crate::hierarchy::SlimOntology`].
    #[error("invalid ontology: {0}")]
    InvalidOntology(String),

    /// No items remained after frequency filtering, or an annotation
    /// referenced a term absent from the ontology.
    #[error("invalid annotations: {0}")]
    InvalidAnnotations(String),

    /// A query referenced a term ID not present in the ontology.
    #[error("unknown term: {0}")]
    UnknownTerm(String),

    /// `score()` was called with an empty term list.
    #[error("query must contain at least one term")]
    EmptyQuery,

    /// Scoring was cancelled via a [`crate::inference::CancellationToken`].
    #[error("scoring was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, BoqaError>;
