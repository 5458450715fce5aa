//! Feature records parsed from a data feed

use geo::Geometry;
use serde_json::Value;

/// Property bag of a feature (the GeoJSON `properties` object)
pub type PropertyMap = serde_json::Map<String, Value>;

/// One geographic record from a feed: a geometry plus an optional property bag.
///
/// Records are immutable once parsed. Rendering consumes the record, so the
/// geometry moves into the rendered element instead of being copied.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub geometry: Geometry<f64>,
    pub properties: Option<PropertyMap>,
}

impl FeatureRecord {
    /// Create a record with no property bag
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            properties: None,
        }
    }

    /// Attach a property bag
    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Raw property value, if the key is present
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|props| props.get(key))
    }

    /// Property rendered as display text; missing keys yield an empty string
    pub fn property_text(&self, key: &str) -> String {
        self.property(key).map(display_value).unwrap_or_default()
    }
}

/// Render a JSON property value as popup text.
///
/// Strings are used verbatim, `null` becomes empty, everything else uses its
/// compact JSON form (`3`, `0.25`, `true`, `[1,2]`).
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point_record() -> FeatureRecord {
        FeatureRecord::new(Geometry::Point(geo::Point::new(-71.3, 41.5)))
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Hotel Viking")), "Hotel Viking");
        assert_eq!(display_value(&json!(12)), "12");
        assert_eq!(display_value(&json!(0.5)), "0.5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&Value::Null), "");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_missing_property_is_empty() {
        let record = point_record();
        assert_eq!(record.property_text("name"), "");

        let mut props = PropertyMap::new();
        props.insert("city".to_string(), json!("Newport"));
        let record = point_record().with_properties(props);
        assert_eq!(record.property_text("city"), "Newport");
        assert_eq!(record.property_text("name"), "");
    }
}
