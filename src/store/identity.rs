//! Fixed identity provider, for the binary and tests.

use super::IdentityProvider;

/// Identity that always reports the same user (or nobody).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    /// Signed in as `user_id`.
    #[must_use]
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// Nobody signed in.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self { user_id: None }
    }
}

impl From<Option<String>> for StaticIdentity {
    fn from(user_id: Option<String>) -> Self {
        Self { user_id }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
