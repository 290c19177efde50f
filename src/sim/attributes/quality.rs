//! Free-form numeric properties (obstacle hardness, value, ...)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quality {
    props: BTreeMap<String, f32>,
}

impl Quality {
    pub fn set(&mut self, name: impl Into<String>, v: f32) {
        self.props.insert(name.into(), v);
    }

    /// Missing properties start from zero
    pub fn increase(&mut self, name: impl Into<String>, v: f32) {
        *self.props.entry(name.into()).or_insert(0.0) += v;
    }

    pub fn decrease(&mut self, name: impl Into<String>, v: f32) {
        self.increase(name, -v);
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.props.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_props() {
        let mut q = Quality::default();
        assert_eq!(q.get("hardness"), None);
        q.increase("hardness", 2.0);
        q.decrease("hardness", 0.5);
        assert_eq!(q.get("hardness"), Some(1.5));
        q.set("hardness", 9.0);
        assert_eq!(q.get("hardness"), Some(9.0));
    }
}
