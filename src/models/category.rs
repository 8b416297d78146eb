use serde::{Deserialize, Serialize};

/// A recipe category. Categories form a flat list with an optional parent
/// reference; the front end derives the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub parent_category_id: Option<i64>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_category_id.is_none()
    }
}
