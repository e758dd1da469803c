//! Stable external identifiers for ontology terms.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::BoqaError;

/// `Identified` is implemented by entities that carry a [`TermId`].
pub trait Identified {
    fn identifier(&self) -> &TermId;
}

/// A compact identifier (CURIE) for an ontology term, e.g. `HP:0001250`.
///
/// `TermId` is the *stable external identifier* of spec.md's data
/// model: it never changes once a term is created, unlike the dense
/// index assigned to the term by [`crate::hierarchy::SlimOntology`].
///
/// ## Examples
///
/// ```
/// use boqa::term_id::TermId;
/// use std::str::FromStr;
///
/// let a = TermId::from_str("HP:0001250").unwrap();
/// let b = TermId::from(("HP", "0001250"));
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "HP:0001250");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId {
    prefix: Box<str>,
    id: Box<str>,
}

impl TermId {
    pub fn new<P, I>(prefix: P, id: I) -> Self
    where
        P: Into<Box<str>>,
        I: Into<Box<str>>,
    {
        Self {
            prefix: prefix.into(),
            id: id.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for TermId {
    fn identifier(&self) -> &TermId {
        self
    }
}

impl<P, I> From<(P, I)> for TermId
where
    P: Into<Box<str>>,
    I: Into<Box<str>>,
{
    fn from(value: (P, I)) -> Self {
        TermId::new(value.0, value.1)
    }
}

impl PartialEq<(&str, &str)> for TermId {
    fn eq(&self, other: &(&str, &str)) -> bool {
        self.prefix.as_ref() == other.0 && self.id.as_ref() == other.1
    }
}

impl FromStr for TermId {
    type Err = BoqaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let delim = s
            .find([':', '_'])
            .ok_or_else(|| BoqaError::InvalidOntology(format!("'{s}' is not a valid CURIE")))?;
        let (prefix, rest) = s.split_at(delim);
        let id = &rest[1..];
        if prefix.is_empty() || id.is_empty() {
            return Err(BoqaError::InvalidOntology(format!(
                "'{s}' is not a valid CURIE"
            )));
        }
        Ok(TermId::new(prefix, id))
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.id)
    }
}
