use reqwest::Method;
use std::borrow::Cow;

/// Placeholder replaced by [`PathSpec::with_id`]
const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    pub path: Cow<'static, str>,
    pub method: Method,
}

impl PathSpec {
    pub const fn get(path: &'static str) -> Self {
        Self {
            path: Cow::Borrowed(path),
            method: Method::GET,
        }
    }

    pub const fn post(path: &'static str) -> Self {
        Self {
            path: Cow::Borrowed(path),
            method: Method::POST,
        }
    }

    /// Fills in the `{id}` segment of the path
    ///
    /// The id is passed through as is, it is opaque to the client
    #[must_use]
    pub fn with_id(&self, id: impl AsRef<str>) -> Self {
        debug_assert!(
            self.path.contains(ID_PLACEHOLDER),
            "path has no id segment: {}",
            self.path
        );
        Self {
            path: Cow::Owned(self.path.replace(ID_PLACEHOLDER, id.as_ref())),
            method: self.method.clone(),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}
