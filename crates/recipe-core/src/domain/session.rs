use super::{Role, UserProfile};
use crate::ports::AuthUser;

/// Where the current session stands.
///
/// The profile (and with it the role) is loaded after the identity is
/// known, so "signed in, role not known yet" is a state of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No auth event received yet.
    #[default]
    Unknown,
    Unauthenticated,
    /// Identity known, profile still loading.
    Authenticating { user: AuthUser },
    Authenticated { user: AuthUser, profile: UserProfile },
    /// Signed in, but the profile could not be read or created.
    ProfileUnavailable { user: AuthUser },
}

impl SessionState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::Unknown | SessionState::Unauthenticated => None,
            SessionState::Authenticating { user }
            | SessionState::Authenticated { user, .. }
            | SessionState::ProfileUnavailable { user } => Some(user),
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            SessionState::Authenticated { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile().map(|profile| profile.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// False while either the identity or its profile is still being resolved.
    pub fn is_settled(&self) -> bool {
        !matches!(
            self,
            SessionState::Unknown | SessionState::Authenticating { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser {
            uid: "u1".to_string(),
            email: Some("a@b.c".to_string()),
            is_anonymous: false,
        }
    }

    #[test]
    fn test_role_unknown_while_authenticating() {
        let state = SessionState::Authenticating { user: user() };

        assert!(state.user().is_some());
        assert_eq!(state.role(), None);
        assert!(!state.is_admin());
        assert!(!state.is_settled());
    }

    #[test]
    fn test_admin_only_when_profile_says_so() {
        let mut profile = UserProfile::default_for(&user());
        let state = SessionState::Authenticated {
            user: user(),
            profile: profile.clone(),
        };
        assert!(!state.is_admin());

        profile.role = Role::Admin;
        let state = SessionState::Authenticated {
            user: user(),
            profile,
        };
        assert!(state.is_admin());
        assert!(state.is_settled());
    }

    #[test]
    fn test_unavailable_profile_is_settled_but_not_admin() {
        let state = SessionState::ProfileUnavailable { user: user() };
        assert!(state.is_settled());
        assert!(!state.is_admin());
        assert!(SessionState::Unauthenticated.user().is_none());
    }
}
