//! Relation triples.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(relation, subject, object)` statement.
///
/// Equality, hashing and ordering are structural over all three fields, so a
/// `BTreeSet<Fact>` behaves as a set of triples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fact {
    pub relation: String,
    pub subject: String,
    pub object: String,
}

impl Fact {
    pub fn new(
        relation: impl Into<String>,
        subject: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            relation: relation.into(),
            subject: subject.into(),
            object: object.into(),
        }
    }

    /// Borrowed `(relation, subject, object)` view.
    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (&self.relation, &self.subject, &self.object)
    }

    pub fn into_tuple(self) -> (String, String, String) {
        (self.relation, self.subject, self.object)
    }
}

impl<R, S, O> From<(R, S, O)> for Fact
where
    R: Into<String>,
    S: Into<String>,
    O: Into<String>,
{
    fn from((relation, subject, object): (R, S, O)) -> Self {
        Fact::new(relation, subject, object)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.relation, self.object)
    }
}

/// Facts whose relation tag contains `relation` (plain substring match).
pub fn facts_with_relation<'a>(
    facts: &'a [Fact],
    relation: &'a str,
) -> impl Iterator<Item = &'a Fact> + 'a {
    facts.iter().filter(move |f| f.relation.contains(relation))
}
