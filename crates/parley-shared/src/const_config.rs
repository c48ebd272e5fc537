//! Stores settings that are not expected to need to change but grouped together
//! for discoverability and reuse. Each constant should be prefixed by the module
//! name to allow importing the constant only and still be readable

pub mod client {
    use std::time::Duration;

    /// Used when no api url is configured (local development server)
    pub const CLIENT_DEFAULT_API_URL: &str = "http://localhost:3001/api";
    /// Path suffix removed from the api url to get the event channel url
    pub const CLIENT_API_PATH_SUFFIX: &str = "/api";
    pub const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);
    pub const CLIENT_DEFAULT_CREDENTIALS_FILE: &str = "parley_credentials.json";
}

pub mod pagination {
    pub const PAGINATION_FIRST_PAGE: u32 = 1;
    pub const PAGINATION_MESSAGES_LIMIT: u32 = 50;
    pub const PAGINATION_CALL_HISTORY_LIMIT: u32 = 20;
}

pub mod path {
    mod path_spec;
    pub use path_spec::PathSpec;
    pub const PATH_AUTH_LOGIN: PathSpec = PathSpec::post("/auth/login");
    pub const PATH_AUTH_LOGOUT: PathSpec = PathSpec::post("/auth/logout");
    pub const PATH_AUTH_ME: PathSpec = PathSpec::get("/auth/me");
    pub const PATH_AUTH_REGISTER: PathSpec = PathSpec::post("/auth/register");
    pub const PATH_CALLS_ANSWER: PathSpec = PathSpec::post("/calls/{id}/answer");
    pub const PATH_CALLS_DECLINE: PathSpec = PathSpec::post("/calls/{id}/decline");
    pub const PATH_CALLS_END: PathSpec = PathSpec::post("/calls/{id}/end");
    pub const PATH_CALLS_HISTORY: PathSpec = PathSpec::get("/calls/history");
    pub const PATH_CALLS_INITIATE: PathSpec = PathSpec::post("/calls/initiate");
    pub const PATH_CHAT_CONVERSATIONS: PathSpec = PathSpec::get("/chat/conversations");
    pub const PATH_CHAT_CONVERSATION_CREATE: PathSpec = PathSpec::post("/chat/conversations");
    pub const PATH_CHAT_MESSAGES: PathSpec = PathSpec::get("/chat/conversations/{id}/messages");
    pub const PATH_CHAT_MESSAGE_SEND: PathSpec =
        PathSpec::post("/chat/conversations/{id}/messages");
}
