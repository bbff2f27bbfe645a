//! Test case descriptors
//!
//! A `TestCase` names the module to execute and the service group it belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable descriptor of one unit of test work
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique test identifier
    pub id: String,

    /// Reference resolved by the module loader
    pub module_reference: String,

    /// Logical service group (unit of sequential ordering)
    pub service: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TestCase {
    pub fn new(
        id: impl Into<String>,
        module_reference: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            module_reference: module_reference.into(),
            service: service.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.id, self.service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_builder() {
        let case = TestCase::new("login", "auth/login", "auth").with_tags(["smoke", "api"]);
        assert_eq!(case.service, "auth");
        assert!(case.has_tag("SMOKE"));
        assert!(!case.has_tag("slow"));
        assert_eq!(case.to_string(), "login [auth]");
    }

    #[test]
    fn test_case_tags_default_when_missing() {
        let json = r#"{"id":"a","module_reference":"m","service":"s"}"#;
        let case: TestCase = serde_json::from_str(json).unwrap();
        assert!(case.tags.is_empty());
    }
}
