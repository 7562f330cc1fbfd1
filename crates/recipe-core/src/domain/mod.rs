//! Domain entities - the core business objects.

mod category;
mod community_post;
mod loose;
mod recipe;
mod save_record;
mod session;
mod user;

pub use category::Category;
pub use community_post::CommunityPost;
pub use loose::split_delimited;
pub use recipe::{INGREDIENT_DELIMITER, INSTRUCTION_DELIMITER, Recipe};
pub use save_record::SaveRecord;
pub use session::SessionState;
pub use user::{Role, UserProfile, display_name_from_email};

/// Names of the backend collections.
pub mod collections {
    pub const RECIPES: &str = "mealsList";
    pub const CATEGORIES: &str = "category";
    pub const SAVES: &str = "save";
    pub const COMMUNITY_POSTS: &str = "communityPosts";
    pub const USERS: &str = "users";
}
