#[derive(Debug)]
/// An error that can occur when interacting with the client.
pub enum ClientError {
    /// The request could not be completed: no connection, timeout, or a
    /// non-success HTTP status.
    Connection(reqwest::Error),
    /// The response arrived but did not have the expected shape.
    Parsing(serde_json::Error),
}
impl ClientError {
    /// The kind of this error, detached from its source so it can be copied
    /// to every party interested in a failed request.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Connection(_) => ErrorKind::Connection,
            ClientError::Parsing(_) => ErrorKind::Parsing,
        }
    }
}
impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Connection(e) => write!(f, "Connection failure: {e}"),
            ClientError::Parsing(e) => write!(f, "Parsing failure: {e}"),
        }
    }
}
impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Connection(e) => Some(e),
            ClientError::Parsing(e) => Some(e),
        }
    }
}
impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Connection(e)
    }
}
impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Parsing(e)
    }
}
/// A result type for the client.
pub type ClientResult<T> = Result<T, ClientError>;

/// The two ways a request can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport-level failure.
    Connection,
    /// The response was received but could not be understood.
    Parsing,
}
impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Connection => write!(f, "connection failure"),
            ErrorKind::Parsing => write!(f, "parsing failure"),
        }
    }
}

/// A client for the PastVu API.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) base_url: String,
    pub(crate) client: reqwest::Client,
}
impl Client {
    /// The public PastVu instance.
    pub const DEFAULT_BASE_URL: &str = "https://pastvu.com";

    /// Create a new client talking to the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// The server this client talks to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
impl Default for Client {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}
