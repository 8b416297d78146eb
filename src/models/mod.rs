//! Data models for CookFlow entities.
//!
//! This module contains the wire types exchanged with the backend:
//!
//! - `Recipe`, `NewRecipe`, `RecipeUpdate`, `Step`: recipes and their steps
//! - `Category`: recipe categories (flat list with optional parent)
//! - `Ingredient`: the ingredient catalog (approved vs admin views)
//! - `Unit`, `UnitType`: measurement units and their families
//! - `Favorite`: a user's saved recipe
//! - `ShoppingListItem` and its input types
//! - `User`, `UserUpdate`: profiles
//! - `Page<T>`: the backend's paginated list envelope

pub mod category;
pub mod ingredient;
pub mod recipe;
pub mod shopping;
pub mod unit;
pub mod user;

pub use category::Category;
pub use ingredient::{Ingredient, IngredientUpdate, NewIngredient};
pub use recipe::{Favorite, NewRecipe, NewStep, Recipe, RecipeUpdate, Step, StepUpdate};
pub use shopping::{NewShoppingListItem, ShoppingListItem, ShoppingListItemUpdate};
pub use unit::{NewUnit, Unit, UnitType, UnitUpdate};
pub use user::{User, UserUpdate};

use serde::Deserialize;

/// Paginated list envelope returned by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paginated_envelope() {
        let json = r#"{
            "count": 2,
            "next": "http://localhost/api/recipes/recipes/?page=2",
            "previous": null,
            "results": [
                {"id": 1, "name": "Tortilla", "description": "Classic", "duration_minutes": 40, "commensals": 4, "categories": [2]},
                {"id": 2, "name": "Gazpacho", "description": "Cold soup", "duration_minutes": 15, "commensals": 2, "categories": [3, 5]}
            ]
        }"#;

        let page: Page<Recipe> = serde_json::from_str(json).expect("parse page");
        assert_eq!(page.count, 2);
        assert!(page.next.is_some());
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[1].name, "Gazpacho");
        assert_eq!(page.results[1].categories, vec![3, 5]);
    }
}
