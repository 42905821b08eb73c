//! Metadata document mapping generated identifiers back to wrap.yml.
//!
//! Downstream consumers use this document to present wire payloads in terms
//! of the user-authored names, so every entry must correspond to something
//! the proto actually declares.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::ir::{FieldIr, FieldOrigin, FieldRole, MethodIr};
use crate::spec::StreamMode;

/// Map that serializes in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    /// Get the entry for `key`, inserting `V::default()` if missing.
    pub fn entry(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        let index = match self.0.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.0.push((key.to_string(), V::default()));
                self.0.len() - 1
            }
        };
        &mut self.0[index].1
    }

    pub fn insert(&mut self, key: String, value: V) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Root of the `meta.yml` document.
#[derive(Debug, Default, Serialize)]
pub struct MetaDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub services: OrderedMap<ServiceMeta>,
    /// Keyed by `<Service>.<Method>`
    pub methods: OrderedMap<MethodMeta>,
    /// Keyed by generated message name
    pub messages: OrderedMap<MessageMeta>,
}

#[derive(Debug, Default, Serialize)]
pub struct ServiceMeta {
    pub methods: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MethodMeta {
    pub operation_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest: Option<serde_yaml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<&'static str>,
    #[serde(rename = "async", skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,
    pub parameters: String,
    pub results: String,
    /// Results of async methods, delivered through the invocation handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub async_results: Option<OrderedMap<FieldMeta>>,
}

#[derive(Debug, Default, Serialize)]
pub struct MessageMeta {
    pub fields: OrderedMap<FieldMeta>,
}

/// Original attributes of one generated field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_yaml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<&FieldOrigin> for FieldMeta {
    fn from(origin: &FieldOrigin) -> Self {
        let (parameter_name, result_name) = match origin.role {
            FieldRole::Parameter => (Some(origin.original_name.clone()), None),
            FieldRole::Result => (None, Some(origin.original_name.clone())),
        };
        Self {
            parameter_name,
            result_name,
            description: origin.description.clone(),
            default: origin.default.clone(),
            mime_type: origin.mime_type.clone(),
            location: origin.location.clone(),
        }
    }
}

impl MethodMeta {
    pub(crate) fn new(method: &MethodIr) -> Self {
        Self {
            operation_name: method.operation_name.clone(),
            description: method.description.clone(),
            rest: method.rest.clone(),
            stream: (method.stream != StreamMode::None).then(|| method.stream.as_str()),
            is_async: method.is_async,
            parameters: method.parameters.name.clone(),
            results: method.results.type_name().to_string(),
            async_results: None,
        }
    }
}

/// Collect the documented fields of a field list, skipping generator-owned ones.
pub(crate) fn field_map(fields: &[FieldIr]) -> OrderedMap<FieldMeta> {
    let mut map = OrderedMap::default();
    for field in fields {
        if let Some(origin) = &field.origin {
            map.insert(field.name.clone(), FieldMeta::from(origin));
        }
    }
    map
}

impl MetaDocument {
    /// Render the document as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::Metadata)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_map_keeps_insertion_order() {
        let mut map = OrderedMap::default();
        map.insert("zeta".to_string(), 1);
        map.insert("alpha".to_string(), 2);
        map.insert("zeta".to_string(), 3);
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, [("zeta", &3), ("alpha", &2)]);
        assert_eq!(map.len(), 2);

        let yaml = serde_yaml::to_string(&map).unwrap();
        assert_eq!(yaml, "zeta: 3\nalpha: 2\n");
    }

    #[test]
    fn test_entry_inserts_default() {
        let mut map: OrderedMap<ServiceMeta> = OrderedMap::default();
        map.entry("Main").methods.push("Ping".to_string());
        map.entry("Main").methods.push("Pong".to_string());
        assert_eq!(map.get("Main").unwrap().methods, ["Ping", "Pong"]);
        assert!(!map.is_empty());
    }

    #[test]
    fn test_absent_values_are_omitted() {
        let meta = FieldMeta::from(&FieldOrigin {
            role: FieldRole::Result,
            original_name: "files".to_string(),
            description: None,
            default: None,
            mime_type: Some("application/json".to_string()),
            location: None,
        });
        let yaml = serde_yaml::to_string(&meta).unwrap();
        assert_eq!(yaml, "result_name: files\nmime_type: application/json\n");
    }
}
