use serde::{Deserialize, Serialize};

/// A user of the internal application, as resolved by its directory API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable subject identifier from the identity provider.
    pub sub: String,
    pub email: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
