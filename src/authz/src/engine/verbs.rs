//! HTTP method to permission verb derivation

use std::collections::HashMap;

/// Fixed, overridable method -> verb derivation table.
///
/// Defaults: GET/HEAD -> `read`, POST -> `create`, PUT/PATCH -> `update`,
/// DELETE -> `delete`. Methods with no mapping derive nothing and the
/// evaluator denies.
#[derive(Debug, Clone)]
pub struct VerbMap {
    map: HashMap<String, String>,
}

impl Default for VerbMap {
    fn default() -> Self {
        let mut map = HashMap::new();
        for (method, verb) in [
            ("GET", "read"),
            ("HEAD", "read"),
            ("POST", "create"),
            ("PUT", "update"),
            ("PATCH", "update"),
            ("DELETE", "delete"),
        ] {
            map.insert(method.to_string(), verb.to_string());
        }
        Self { map }
    }
}

impl VerbMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override or add a derivation. Method names are case-insensitive.
    pub fn with_mapping(mut self, method: impl Into<String>, verb: impl Into<String>) -> Self {
        self.map.insert(method.into().to_uppercase(), verb.into());
        self
    }

    /// The verb derived for an HTTP-style method, if any
    pub fn derive(&self, method: &str) -> Option<&str> {
        self.map.get(&method.to_uppercase()).map(String::as_str)
    }
}
