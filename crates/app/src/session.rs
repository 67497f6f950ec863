use uuid::Uuid;

pub const DEFAULT_PASSWORD: &str = "TestPass123!";

/// Throwaway account details for one registration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Build credentials whose username and email carry a random suffix, so repeated
    /// runs against the same server never collide.
    pub fn generate(prefix: &str, password: &str) -> Self {
        let suffix = unique_suffix();
        Self {
            username: format!("{prefix}_{suffix}"),
            email: format!("{prefix}_{suffix}@example.com"),
            password: password.to_owned(),
        }
    }
}

pub fn unique_suffix() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[..12].to_owned()
}

/// Bearer token and user id for the authenticated account.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    token: Option<String>,
    user_id: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever the previous auth call stored.
    pub fn authenticate(&mut self, token: impl Into<String>, user_id: Option<String>) {
        self.token = Some(token.into());
        self.user_id = user_id;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn bearer(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {token}"))
    }
}
