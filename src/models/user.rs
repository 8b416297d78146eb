use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Staff flag as the server reports it; authoritative, unlike the
    /// hint carried in the token claims.
    #[serde(default)]
    pub is_staff: bool,
}

impl User {
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() => format!("{} {}", first, last),
            (Some(first), None) if !first.is_empty() => first.to_string(),
            _ => self.username.clone(),
        }
    }
}

/// Partial profile update payload (PATCH); only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_username() {
        let user = User {
            id: 1,
            username: "ana".into(),
            email: "ana@example.com".into(),
            first_name: None,
            last_name: None,
            is_staff: false,
        };
        assert_eq!(user.display_name(), "ana");

        let named = User {
            first_name: Some("Ana".into()),
            last_name: Some("Castro".into()),
            ..user
        };
        assert_eq!(named.display_name(), "Ana Castro");
    }
}
