//! Connection configuration for the index registry.

use opensearch::auth::Credentials;

/// Default OpenSearch URL.
pub const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Authentication used when talking to the registry.
///
/// Each variant carries exactly the credentials it needs, so a basic-auth
/// configuration without a password cannot be constructed.
#[derive(Clone, PartialEq, Eq)]
pub enum RegistryAuth {
    /// No authentication.
    None,
    /// HTTP basic authentication.
    Basic { username: String, password: String },
    /// Bearer token authentication.
    Bearer { token: String },
}

impl RegistryAuth {
    /// Short name of the scheme, safe to log.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
        }
    }

    /// Transport credentials for this scheme.
    pub fn credentials(&self) -> Option<Credentials> {
        match self {
            Self::None => None,
            Self::Basic { username, password } => {
                Some(Credentials::Basic(username.clone(), password.clone()))
            }
            Self::Bearer { token } => Some(Credentials::Bearer(token.clone())),
        }
    }
}

// Manual impl keeps secrets out of logs.
impl std::fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
        }
    }
}

/// Configuration for connecting to the index registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// The registry URL (e.g. "http://localhost:9200").
    pub url: String,
    /// Authentication scheme and credentials.
    pub auth: RegistryAuth,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OPENSEARCH_URL.to_string(),
            auth: RegistryAuth::None,
        }
    }
}

impl RegistryConfig {
    /// Create a config for `url` with the given authentication.
    pub fn new(url: impl Into<String>, auth: RegistryAuth) -> Self {
        Self {
            url: url.into(),
            auth,
        }
    }
}
