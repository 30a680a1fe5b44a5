use crate::DataError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct GeoJsonFeatureCollection {
    #[serde(default)]
    features: Vec<Value>,
}

/// Region id to display name lookup, loaded once per boundary layer.
///
/// The full boundary feature of every region is retained so selected regions
/// can be exported as GeoJSON.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    names: HashMap<String, String>,
    features: HashMap<String, Value>,
    order: Vec<String>,
}

impl RegionRegistry {
    /// Build a registry from a GeoJSON FeatureCollection.
    ///
    /// Features whose `id_field` property is missing are ignored. Numeric ids
    /// are read as their decimal text so they match tabular region ids.
    pub fn from_geojson_str(
        geojson: &str,
        id_field: &str,
        name_field: &str,
    ) -> Result<Self, DataError> {
        let collection: GeoJsonFeatureCollection = serde_json::from_str(geojson)?;
        let mut registry = RegionRegistry::default();
        let mut ignored = 0u32;

        for feature in collection.features {
            let properties = feature.get("properties");
            let Some(id) = properties
                .and_then(|p| p.get(id_field))
                .and_then(property_text)
            else {
                ignored += 1;
                continue;
            };
            if let Some(name) = properties.and_then(|p| p.get(name_field)).and_then(property_text) {
                registry.names.insert(id.clone(), name);
            }
            if !registry.features.contains_key(&id) {
                registry.order.push(id.clone());
            }
            registry.features.insert(id, feature);
        }

        log::info!(
            "region: Loaded {} boundary features, ignored {} without '{}'",
            registry.order.len(),
            ignored,
            id_field
        );
        Ok(registry)
    }

    /// Registered display name, if any.
    pub fn name(&self, region_id: &str) -> Option<&str> {
        self.names.get(region_id).map(String::as_str)
    }

    /// Display name, falling back to the region id itself.
    pub fn display_name(&self, region_id: &str) -> String {
        self.name(region_id).unwrap_or(region_id).to_string()
    }

    pub fn feature(&self, region_id: &str) -> Option<&Value> {
        self.features.get(region_id)
    }

    /// Region ids in boundary-file order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn property_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
