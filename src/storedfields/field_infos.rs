//! Field-number to field-name bijection, one instance per segment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::types::FieldNumber;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldInfos {
    names: Vec<String>,
    by_name: HashMap<String, FieldNumber>,
}

impl FieldInfos {
    pub fn new() -> Self {
        FieldInfos::default()
    }

    /// Returns the existing number if `name` was already added, otherwise
    /// assigns the next dense number.
    pub fn add(&mut self, name: impl Into<String>) -> FieldNumber {
        let name = name.into();
        if let Some(&number) = self.by_name.get(&name) {
            return number;
        }
        let number = FieldNumber::new(self.names.len() as u32);
        self.by_name.insert(name.clone(), number);
        self.names.push(name);
        number
    }

    pub fn number_of(&self, name: &str) -> Option<FieldNumber> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, number: FieldNumber) -> Option<&str> {
        self.names.get(number.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent_per_name() {
        let mut infos = FieldInfos::new();
        let a = infos.add("title");
        let b = infos.add("body");
        let a_again = infos.add("title");
        assert_eq!(a, a_again);
        assert_ne!(a, b);
        assert_eq!(infos.name_of(a), Some("title"));
        assert_eq!(infos.number_of("body"), Some(b));
        assert_eq!(infos.number_of("missing"), None);
    }
}
