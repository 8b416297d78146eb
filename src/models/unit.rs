use serde::{Deserialize, Serialize};

/// A measurement unit, e.g. "gram" / "g".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub name: String,
    pub abbreviation: String,
    /// Id of the [`UnitType`] this unit belongs to.
    pub unit_type: i64,
}

/// Payload for creating a unit (admin).
#[derive(Debug, Clone, Serialize)]
pub struct NewUnit {
    pub name: String,
    pub abbreviation: String,
    pub unit_type: i64,
}

/// Partial update payload (PATCH); only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<i64>,
}

/// A unit family (weight, volume, count). Read-only fixed data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitType {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unit_with_type_reference() {
        let json = r#"{ "id": 2, "name": "gram", "abbreviation": "g", "unit_type": 1 }"#;
        let unit: Unit = serde_json::from_str(json).expect("parse");
        assert_eq!(unit.abbreviation, "g");
        assert_eq!(unit.unit_type, 1);
    }

    #[test]
    fn rename_sends_only_the_name() {
        let update = UnitUpdate {
            name: Some("gramo".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json, serde_json::json!({ "name": "gramo" }));
    }
}
