//! Authentication implementations.

mod consent;
mod jwt;
mod memory;
mod password;

pub use consent::DevConsent;
pub use jwt::{JwtConfig, JwtIdTokenService};
pub use memory::InMemoryAuthProvider;
pub use password::Argon2PasswordService;
