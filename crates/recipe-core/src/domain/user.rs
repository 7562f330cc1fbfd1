use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::collections;
use crate::error::DomainError;
use crate::ports::{AuthUser, DocumentSnapshot, Fields};

/// Role stored on the profile document. Unknown roles read as `User`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Profile document kept next to each auth identity (`users/{uid}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: String,
}

impl UserProfile {
    /// Profile written on an identity's first sign-in.
    pub fn default_for(user: &AuthUser) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user
                .email
                .clone()
                .unwrap_or_else(|| "anonymous".to_string()),
            role: Role::User,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn from_document(doc: &DocumentSnapshot) -> Result<Self, DomainError> {
        let mut profile: UserProfile = doc.decode().map_err(|e| DomainError::Malformed {
            collection: collections::USERS,
            id: doc.id.clone(),
            reason: e.to_string(),
        })?;
        if profile.uid.is_empty() {
            profile.uid = doc.id.clone();
        }
        Ok(profile)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn to_fields(&self) -> Fields {
        Fields::new()
            .set("uid", self.uid.as_str())
            .set("email", self.email.as_str())
            .set("role", self.role.as_str())
            .set("createdAt", self.created_at.as_str())
    }
}

/// Best-effort display name: the local part of an email address.
pub fn display_name_from_email(email: Option<&str>) -> String {
    email
        .and_then(|email| email.split('@').next())
        .filter(|local| !local.is_empty())
        .map(String::from)
        .unwrap_or_else(|| "Anonymous".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_role_reads_as_user() {
        let data = json!({ "email": "a@b.c", "role": "moderator" })
            .as_object()
            .cloned()
            .unwrap();
        let profile = UserProfile::from_document(&DocumentSnapshot::new("u1", data)).unwrap();

        assert_eq!(profile.role, Role::User);
        assert_eq!(profile.uid, "u1");
        assert!(!profile.is_admin());
    }

    #[test]
    fn test_admin_role() {
        let data = json!({ "uid": "u2", "email": "chef@b.c", "role": "admin" })
            .as_object()
            .cloned()
            .unwrap();
        let profile = UserProfile::from_document(&DocumentSnapshot::new("u2", data)).unwrap();
        assert!(profile.is_admin());
    }

    #[test]
    fn test_default_profile_for_anonymous_identity() {
        let user = AuthUser {
            uid: "anon".to_string(),
            email: None,
            is_anonymous: true,
        };
        let profile = UserProfile::default_for(&user);

        assert_eq!(profile.email, "anonymous");
        assert_eq!(profile.role, Role::User);
    }

    #[test]
    fn test_display_name_from_email() {
        assert_eq!(display_name_from_email(Some("julia@chef.io")), "julia");
        assert_eq!(display_name_from_email(Some("@chef.io")), "Anonymous");
        assert_eq!(display_name_from_email(None), "Anonymous");
    }
}
