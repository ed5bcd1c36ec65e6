//! Subject values
//!
//! Provides [`Subject`], the identity every trigger, context entry and
//! command is scoped to.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A logical thing the user can interact with
///
/// Equality is structural: two subjects are equal when both the type and
/// the optional instance id are equal (`None == None`). Subjects are never
/// mutated after creation.
///
/// # Example
/// ```
/// use tally_context::Subject;
///
/// let entry = Subject::with_id("Entry", "42");
/// assert_eq!(entry.to_string(), "Entry[42]");
/// assert_eq!(Subject::new("Log").to_string(), "Log");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// Subject type (`Entry`, `Log`, `Account`)
    #[serde(rename = "type")]
    kind: String,

    /// Optional instance id
    #[serde(default)]
    id: Option<String>,
}

impl Subject {
    /// Create a subject without an instance id
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
        }
    }

    /// Create a subject for a specific instance
    #[inline]
    #[must_use]
    pub fn with_id(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id.into()),
        }
    }

    /// Create a subject from an optional id
    #[inline]
    #[must_use]
    pub fn from_parts(kind: impl Into<String>, id: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }

    /// Subject type
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Instance id, if any
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Check whether this subject has the given type
    #[inline]
    #[must_use]
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => write!(f, "{}[{}]", self.kind, id),
            _ => f.write_str(&self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality() {
        assert_eq!(Subject::with_id("Entry", "42"), Subject::with_id("Entry", "42"));
        assert_eq!(Subject::new("Log"), Subject::from_parts("Log", None));
        assert_ne!(Subject::with_id("Entry", "42"), Subject::with_id("Entry", "43"));
        assert_ne!(Subject::new("Entry"), Subject::with_id("Entry", "42"));
        assert_ne!(Subject::new("Log"), Subject::new("Account"));
    }

    #[test]
    fn display_omits_empty_id() {
        assert_eq!(Subject::with_id("Entry", "42").to_string(), "Entry[42]");
        assert_eq!(Subject::with_id("Entry", "").to_string(), "Entry");
        assert_eq!(Subject::new("Log").to_string(), "Log");
    }

    #[test]
    fn serde_uses_type_field() {
        let subject: Subject = serde_json::from_str(r#"{"type":"Entry","id":"7"}"#).unwrap();
        assert_eq!(subject, Subject::with_id("Entry", "7"));

        let log: Subject = serde_json::from_str(r#"{"type":"Log"}"#).unwrap();
        assert_eq!(log.id(), None);

        let json = serde_json::to_string(&Subject::new("Log")).unwrap();
        assert_eq!(json, r#"{"type":"Log","id":null}"#);
    }
}
