use serde::{Deserialize, Serialize};

/// An ingredient from the backend catalog.
///
/// The public endpoints only return approved entries; the admin
/// endpoints return everything, so `is_approved` matters there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub is_checked: bool,
    #[serde(default)]
    pub is_approved: bool,
}

/// Payload for creating an ingredient (admin endpoints only).
#[derive(Debug, Clone, Serialize)]
pub struct NewIngredient {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub is_approved: bool,
}

/// Partial update payload (PATCH); only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngredientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
}
