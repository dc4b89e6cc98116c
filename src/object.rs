//! Property-table collaborator: result arrays carry positional captures
//! plus named data properties whose enumeration order is insertion order.

use rustc_hash::FxHashMap;

use crate::types::Value;

#[derive(Debug)]
pub struct RtObject {
    elements: Vec<Value>,
    properties: FxHashMap<String, Value>,
    property_order: Vec<String>,
}

impl RtObject {
    /// An array-like object with `len` positional slots, all `Undefined`.
    pub fn array(len: usize) -> Self {
        Self {
            elements: vec![Value::Undefined; len],
            properties: FxHashMap::default(),
            property_order: Vec::new(),
        }
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [Value] {
        &mut self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn insert_value(&mut self, key: &str, value: Value) {
        if !self.properties.contains_key(key) {
            self.property_order.push(key.to_string());
        }
        self.properties.insert(key.to_string(), value);
    }

    pub fn get_property(&self, key: &str) -> Value {
        self.properties
            .get(key)
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    /// Named property keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.property_order.iter().map(String::as_str)
    }
}
