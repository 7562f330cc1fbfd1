//! Named navigation targets and the paths they render to.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Home,
    RecipeDetail(String),
    Category(String),
    Login,
    Register,
    Admin,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::RecipeDetail(id) => format!("/detailPost/{id}"),
            Route::Category(name) => format!("/category/{}", encode_component(name)),
            Route::Login => "/auth/login".to_string(),
            Route::Register => "/auth/register".to_string(),
            Route::Admin => "/admin/manage".to_string(),
        }
    }
}

/// Percent-encode a path segment, leaving the URI-component safe set as is.
fn encode_component(segment: &str) -> String {
    const UNRESERVED: &[u8] = b"-_.!~*'()";

    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || UNRESERVED.contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::RecipeDetail("abc".into()).path(), "/detailPost/abc");
        assert_eq!(Route::Login.path(), "/auth/login");
        assert_eq!(Route::Register.path(), "/auth/register");
        assert_eq!(Route::Admin.path(), "/admin/manage");
    }

    #[test]
    fn test_category_name_is_encoded() {
        assert_eq!(
            Route::Category("Soups & Stews".into()).path(),
            "/category/Soups%20%26%20Stews"
        );
        assert_eq!(Route::Category("Crème brûlée".into()).path(), "/category/Cr%C3%A8me%20br%C3%BBl%C3%A9e");
    }
}
