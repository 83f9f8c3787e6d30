use thiserror::Error;

/// Failures of one proxy request. All of them end the request with a 500.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("Failed to get access token: {0}")]
    TokenExchange(String),

    #[error("Failed to fetch table records: {0}")]
    TableFetch(String),
}

/// Failures of the site loading records from the proxy.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Unexpected response, expected a list of records")]
    NotAnArray,
}

#[derive(Error, Debug, PartialEq)]
pub enum NavigationError {
    #[error("At least one tab must list records")]
    NoFilterTab,

    #[error("Duplicated tab key: {0}")]
    DuplicatedKey(String),

    #[error("Tab {0} has both a category and a link")]
    AmbiguousTab(String),
}
