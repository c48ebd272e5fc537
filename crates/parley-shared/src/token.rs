/// Bearer token issued by the backend on login or registration
#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AuthToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AuthToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<AuthToken> for serde_json::Value {
    fn from(value: AuthToken) -> Self {
        serde_json::Value::String(value.0)
    }
}

impl std::fmt::Debug for AuthToken {
    // Tokens end up in spans, never print the value
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("len", &self.0.len())
            .finish()
    }
}
