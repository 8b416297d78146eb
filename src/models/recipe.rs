use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub commensals: i32,
    /// Category ids assigned to this recipe.
    #[serde(default)]
    pub categories: Vec<i64>,
    /// Owner; assigned by the backend from the authenticated user.
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Read-only on the backend; never sent on create/update.
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Recipe {
    /// Display string for the duration, e.g. "1h 15m" or "40m".
    pub fn duration_display(&self) -> String {
        let hours = self.duration_minutes / 60;
        let minutes = self.duration_minutes % 60;
        if hours > 0 && minutes > 0 {
            format!("{}h {}m", hours, minutes)
        } else if hours > 0 {
            format!("{}h", hours)
        } else {
            format!("{}m", minutes)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: i64,
    pub order: i32,
    pub description: String,
    /// Parent recipe id; present on the standalone step endpoints,
    /// omitted when steps come nested inside a recipe.
    #[serde(default)]
    pub recipe: Option<i64>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Payload for creating a step on the standalone step endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct NewStep {
    pub order: i32,
    pub description: String,
    /// Id of the parent recipe.
    pub recipe: i64,
}

/// Partial step update payload (PATCH); only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for creating a recipe. `user` and `steps` are excluded:
/// the backend assigns the owner and steps are read-only here.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub commensals: i32,
    pub categories: Vec<i64>,
}

/// Partial update payload (PATCH); only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecipeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commensals: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_display_formats() {
        let mut recipe = Recipe {
            id: 1,
            name: "Paella".into(),
            description: String::new(),
            duration_minutes: 75,
            commensals: 6,
            categories: vec![],
            user_id: None,
            image_url: None,
            steps: vec![],
            created_at: None,
        };
        assert_eq!(recipe.duration_display(), "1h 15m");
        recipe.duration_minutes = 120;
        assert_eq!(recipe.duration_display(), "2h");
        recipe.duration_minutes = 40;
        assert_eq!(recipe.duration_display(), "40m");
    }

    #[test]
    fn reorder_step_sends_only_the_order() {
        let update = StepUpdate {
            order: Some(3),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json, serde_json::json!({ "order": 3 }));
    }

    #[test]
    fn update_skips_unset_fields() {
        let update = RecipeUpdate {
            name: Some("Paella mixta".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json, serde_json::json!({"name": "Paella mixta"}));
    }
}
