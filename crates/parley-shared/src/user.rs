/// The user record returned by the backend on login, registration and
/// `/auth/me`. Kept as received, the client does not interpret it beyond
/// the name getter
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct UserData(serde_json::Value);

impl UserData {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(serde_json::Value::as_str)
    }
}

impl From<UserData> for serde_json::Value {
    fn from(value: UserData) -> Self {
        value.0
    }
}
