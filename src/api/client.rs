//! Typed service layer for the CookFlow API.
//!
//! `ApiClient` wraps the [`Gateway`] with one method per endpoint the
//! front end consumes: authentication, recipes, steps, ingredients,
//! units, categories, favorites, shopping-list items and user profiles.
//! All requests inherit the gateway's token attachment and
//! refresh-on-401 behavior.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::AuthEvent;
use crate::models::{
    Category, Favorite, Ingredient, IngredientUpdate, NewIngredient, NewRecipe,
    NewShoppingListItem, NewStep, NewUnit, Page, Recipe, RecipeUpdate, ShoppingListItem,
    ShoppingListItemUpdate, Step, StepUpdate, Unit, UnitType, UnitUpdate, User, UserUpdate,
};

use super::Gateway;

// ============================================================================
// Endpoint paths
// ============================================================================

/// Maximum concurrent API requests when hydrating several recipes.
/// Limits parallel requests to avoid overwhelming the server.
const MAX_CONCURRENT_REQUESTS: usize = 10;

const TOKEN_URL: &str = "/token/";
const LOGOUT_URL: &str = "/logout/";
const RECIPES_URL: &str = "/recipes/recipes";
const CATEGORIES_URL: &str = "/recipes/categories";
/// Public ingredient catalog; only approved entries.
const INGREDIENTS_URL: &str = "/recipes/ingredients";
/// Admin ingredient router; full catalog and write access.
const ADMIN_INGREDIENTS_URL: &str = "/recipes/admin/ingredients";
const STEPS_URL: &str = "/steps";
const UNITS_URL: &str = "/units";
const UNIT_TYPES_URL: &str = "/measurements/unit-types";
const FAVORITES_URL: &str = "/favorites";
const SHOPPING_ITEMS_URL: &str = "/shopping/items";
const USERS_URL: &str = "/users";

#[derive(Debug, Deserialize)]
struct TokenPairResponse {
    access: String,
    refresh: String,
}

/// Service client for the CookFlow API.
/// Clone is cheap - the gateway is shared behind an `Arc`.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<Gateway>,
}

impl ApiClient {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    // ===== Authentication =====

    /// Log in and persist the returned credential pair.
    ///
    /// `/token/` is exempt from token attachment, so a stale stored token
    /// never leaks into the login request.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let body = json!({ "username": username, "password": password });
        let response = self
            .gateway
            .send(Method::POST, TOKEN_URL, None, Some(&body))
            .await?;
        let response = Gateway::check_response(response).await?;

        let pair: TokenPairResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        self.gateway
            .store()
            .set_pair(pair.access, pair.refresh)
            .context("Failed to persist credential pair")?;
        self.gateway.events().publish(AuthEvent::LoggedIn);
        info!(username, "Logged in");
        Ok(())
    }

    /// Register a new account.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let body = json!({ "username": username, "email": email, "password": password });
        self.gateway.post(&format!("{}/", USERS_URL), &body).await
    }

    /// Log out: best-effort server-side refresh-token invalidation, then
    /// clear local tokens and broadcast `LoggedOut` exactly once.
    ///
    /// The gateway never starts a refresh cycle for `/logout/`; a 401 from
    /// a dead session is logged and local logout proceeds.
    pub async fn logout(&self) -> Result<()> {
        // Capture before clearing; the server call needs it.
        let refresh_token = self.gateway.store().refresh_token();

        if let Some(refresh) = refresh_token {
            let body = json!({ "refresh": refresh });
            match self
                .gateway
                .send(Method::POST, LOGOUT_URL, None, Some(&body))
                .await
            {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "Server-side logout rejected");
                }
                Err(err) => warn!(error = %err, "Server-side logout failed"),
                Ok(_) => {}
            }
        }

        self.gateway
            .store()
            .clear()
            .context("Failed to clear stored tokens")?;
        self.gateway.events().publish(AuthEvent::LoggedOut);
        info!("Logged out");
        Ok(())
    }

    /// Whether a non-expired access token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.gateway.store().is_access_valid()
    }

    /// User id from the stored access token claims.
    pub fn current_user_id(&self) -> Result<i64> {
        self.gateway
            .store()
            .claims()
            .and_then(|c| c.user_id)
            .context("No user id available - not logged in")
    }

    // ===== Recipes =====

    pub async fn fetch_recipes(&self) -> Result<Page<Recipe>> {
        self.gateway.get(&format!("{}/", RECIPES_URL)).await
    }

    /// The `limit` most recently created recipes.
    pub async fn fetch_latest_recipes(&self, limit: u32) -> Result<Vec<Recipe>> {
        let query = [
            ("ordering", "-created_at".to_string()),
            ("limit", limit.to_string()),
        ];
        let page: Page<Recipe> = self
            .gateway
            .get_with_query(&format!("{}/", RECIPES_URL), &query)
            .await?;
        Ok(page.results)
    }

    /// Search recipes by name, optionally narrowed to one category.
    pub async fn search_recipes(
        &self,
        search: &str,
        category: Option<i64>,
    ) -> Result<Page<Recipe>> {
        let mut query = vec![("search", search.to_string())];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        self.gateway
            .get_with_query(&format!("{}/", RECIPES_URL), &query)
            .await
    }

    pub async fn fetch_recipe(&self, recipe_id: i64) -> Result<Recipe> {
        self.gateway
            .get(&format!("{}/{}/", RECIPES_URL, recipe_id))
            .await
    }

    /// Fetch several recipes by id with bounded concurrency, preserving
    /// input order. Used to hydrate favorite lists and the discovery deck.
    pub async fn fetch_recipes_by_ids(&self, recipe_ids: &[i64]) -> Result<Vec<Recipe>> {
        let results: Vec<Result<Recipe>> = stream::iter(recipe_ids.iter().copied())
            .map(|id| self.fetch_recipe(id))
            .buffered(MAX_CONCURRENT_REQUESTS)
            .collect()
            .await;
        results.into_iter().collect()
    }

    pub async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        let body = serde_json::to_value(recipe)?;
        self.gateway.post(&format!("{}/", RECIPES_URL), &body).await
    }

    pub async fn update_recipe(&self, recipe_id: i64, update: &RecipeUpdate) -> Result<Recipe> {
        let body = serde_json::to_value(update)?;
        self.gateway
            .patch(&format!("{}/{}/", RECIPES_URL, recipe_id), &body)
            .await
    }

    pub async fn delete_recipe(&self, recipe_id: i64) -> Result<()> {
        self.gateway
            .delete(&format!("{}/{}/", RECIPES_URL, recipe_id))
            .await
    }

    // ===== Steps =====

    /// Steps of one recipe, via the standalone step endpoints.
    pub async fn fetch_recipe_steps(&self, recipe_id: i64) -> Result<Vec<Step>> {
        let query = [("recipe_id", recipe_id.to_string())];
        self.gateway
            .get_with_query(&format!("{}/", STEPS_URL), &query)
            .await
    }

    pub async fn fetch_step(&self, step_id: i64) -> Result<Step> {
        self.gateway
            .get(&format!("{}/{}/", STEPS_URL, step_id))
            .await
    }

    pub async fn create_step(&self, step: &NewStep) -> Result<Step> {
        let body = serde_json::to_value(step)?;
        self.gateway.post(&format!("{}/", STEPS_URL), &body).await
    }

    pub async fn update_step(&self, step_id: i64, update: &StepUpdate) -> Result<Step> {
        let body = serde_json::to_value(update)?;
        self.gateway
            .patch(&format!("{}/{}/", STEPS_URL, step_id), &body)
            .await
    }

    pub async fn delete_step(&self, step_id: i64) -> Result<()> {
        self.gateway
            .delete(&format!("{}/{}/", STEPS_URL, step_id))
            .await
    }

    // ===== Ingredients =====

    /// Approved ingredients only; the public catalog view.
    pub async fn fetch_ingredients(&self) -> Result<Vec<Ingredient>> {
        self.gateway.get(&format!("{}/", INGREDIENTS_URL)).await
    }

    pub async fn fetch_ingredient(&self, ingredient_id: i64) -> Result<Ingredient> {
        self.gateway
            .get(&format!("{}/{}/", INGREDIENTS_URL, ingredient_id))
            .await
    }

    /// Full catalog, approved or not. Requires staff privileges.
    pub async fn fetch_all_ingredients(&self) -> Result<Vec<Ingredient>> {
        self.gateway
            .get(&format!("{}/", ADMIN_INGREDIENTS_URL))
            .await
    }

    /// Any ingredient regardless of approval. Requires staff privileges.
    pub async fn fetch_any_ingredient(&self, ingredient_id: i64) -> Result<Ingredient> {
        self.gateway
            .get(&format!("{}/{}/", ADMIN_INGREDIENTS_URL, ingredient_id))
            .await
    }

    /// Create an ingredient. Requires staff privileges.
    pub async fn create_ingredient(&self, ingredient: &NewIngredient) -> Result<Ingredient> {
        let body = serde_json::to_value(ingredient)?;
        self.gateway
            .post(&format!("{}/", ADMIN_INGREDIENTS_URL), &body)
            .await
    }

    /// Update an ingredient, e.g. flip `is_approved`. Requires staff
    /// privileges.
    pub async fn update_ingredient(
        &self,
        ingredient_id: i64,
        update: &IngredientUpdate,
    ) -> Result<Ingredient> {
        let body = serde_json::to_value(update)?;
        self.gateway
            .patch(&format!("{}/{}/", ADMIN_INGREDIENTS_URL, ingredient_id), &body)
            .await
    }

    /// Delete an ingredient. Requires staff privileges.
    pub async fn delete_ingredient(&self, ingredient_id: i64) -> Result<()> {
        self.gateway
            .delete(&format!("{}/{}/", ADMIN_INGREDIENTS_URL, ingredient_id))
            .await
    }

    // ===== Units =====

    pub async fn fetch_units(&self) -> Result<Vec<Unit>> {
        self.gateway.get(&format!("{}/", UNITS_URL)).await
    }

    pub async fn fetch_unit(&self, unit_id: i64) -> Result<Unit> {
        self.gateway
            .get(&format!("{}/{}/", UNITS_URL, unit_id))
            .await
    }

    /// Create a unit. Requires staff privileges.
    pub async fn create_unit(&self, unit: &NewUnit) -> Result<Unit> {
        let body = serde_json::to_value(unit)?;
        self.gateway.post(&format!("{}/", UNITS_URL), &body).await
    }

    /// Update a unit. Requires staff privileges.
    pub async fn update_unit(&self, unit_id: i64, update: &UnitUpdate) -> Result<Unit> {
        let body = serde_json::to_value(update)?;
        self.gateway
            .patch(&format!("{}/{}/", UNITS_URL, unit_id), &body)
            .await
    }

    /// Delete a unit. Requires staff privileges.
    pub async fn delete_unit(&self, unit_id: i64) -> Result<()> {
        self.gateway
            .delete(&format!("{}/{}/", UNITS_URL, unit_id))
            .await
    }

    /// Unit families (weight, volume, count). Read-only fixed data.
    pub async fn fetch_unit_types(&self) -> Result<Vec<UnitType>> {
        self.gateway.get(&format!("{}/", UNIT_TYPES_URL)).await
    }

    pub async fn fetch_unit_type(&self, unit_type_id: i64) -> Result<UnitType> {
        self.gateway
            .get(&format!("{}/{}/", UNIT_TYPES_URL, unit_type_id))
            .await
    }

    // ===== Categories =====

    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        self.gateway.get(&format!("{}/", CATEGORIES_URL)).await
    }

    pub async fn fetch_category(&self, category_id: i64) -> Result<Category> {
        self.gateway
            .get(&format!("{}/{}/", CATEGORIES_URL, category_id))
            .await
    }

    /// Create a category. Requires staff privileges server-side.
    pub async fn create_category(&self, name: &str, parent: Option<i64>) -> Result<Category> {
        let body = json!({ "name": name, "parent_category_id": parent });
        self.gateway
            .post(&format!("{}/", CATEGORIES_URL), &body)
            .await
    }

    pub async fn rename_category(&self, category_id: i64, name: &str) -> Result<Category> {
        let body = json!({ "name": name });
        self.gateway
            .patch(&format!("{}/{}/", CATEGORIES_URL, category_id), &body)
            .await
    }

    pub async fn delete_category(&self, category_id: i64) -> Result<()> {
        self.gateway
            .delete(&format!("{}/{}/", CATEGORIES_URL, category_id))
            .await
    }

    // ===== Favorites =====

    pub async fn fetch_favorites(&self) -> Result<Vec<Favorite>> {
        self.gateway.get(&format!("{}/", FAVORITES_URL)).await
    }

    pub async fn add_favorite(&self, recipe_id: i64) -> Result<Favorite> {
        let user_id = self.current_user_id()?;
        let body = json!({ "user_id": user_id, "recipe_id": recipe_id });
        self.gateway
            .post(&format!("{}/", FAVORITES_URL), &body)
            .await
    }

    pub async fn remove_favorite(&self, favorite_id: i64) -> Result<()> {
        self.gateway
            .delete(&format!("{}/{}/", FAVORITES_URL, favorite_id))
            .await
    }

    // ===== Shopping list =====

    pub async fn fetch_shopping_list(&self) -> Result<Vec<ShoppingListItem>> {
        self.gateway.get(&format!("{}/", SHOPPING_ITEMS_URL)).await
    }

    pub async fn add_shopping_item(
        &self,
        item: &NewShoppingListItem,
    ) -> Result<ShoppingListItem> {
        let body = serde_json::to_value(item)?;
        self.gateway
            .post(&format!("{}/", SHOPPING_ITEMS_URL), &body)
            .await
    }

    pub async fn update_shopping_item(
        &self,
        item_id: i64,
        update: &ShoppingListItemUpdate,
    ) -> Result<ShoppingListItem> {
        let body = serde_json::to_value(update)?;
        self.gateway
            .patch(&format!("{}/{}/", SHOPPING_ITEMS_URL, item_id), &body)
            .await
    }

    pub async fn delete_shopping_item(&self, item_id: i64) -> Result<()> {
        self.gateway
            .delete(&format!("{}/{}/", SHOPPING_ITEMS_URL, item_id))
            .await
    }

    // ===== Users =====

    pub async fn me(&self) -> Result<User> {
        self.gateway.get(&format!("{}/me/", USERS_URL)).await
    }

    pub async fn update_me(&self, update: &UserUpdate) -> Result<User> {
        let body = serde_json::to_value(update)?;
        self.gateway
            .patch(&format!("{}/me/", USERS_URL), &body)
            .await
    }

    pub async fn fetch_user(&self, user_id: i64) -> Result<User> {
        self.gateway
            .get(&format!("{}/{}/", USERS_URL, user_id))
            .await
    }
}
