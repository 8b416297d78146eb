use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: i64,
    /// Assigned by the backend from the authenticated user.
    #[serde(default)]
    pub user_id: Option<i64>,
    pub ingredient_id: i64,
    pub quantity_needed: i32,
    pub unit: String,
    pub is_purchased: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewShoppingListItem {
    pub ingredient_id: i64,
    pub quantity_needed: i32,
    pub unit: String,
    pub is_purchased: bool,
}

/// Partial update payload (PATCH); only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShoppingListItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_needed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_purchased: Option<bool>,
}
