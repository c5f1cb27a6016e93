//! Server-held API key
//!
//! The key is read from the process environment on every request, so a
//! rotated key is picked up without a restart.

use std::fmt;

/// Where the upstream API key comes from
#[derive(Clone)]
pub enum Credential {
    /// Read the named environment variable at request time
    Env(String),
    /// Fixed value (tests, embedding)
    Fixed(String),
}

impl Credential {
    /// Current key value, `None` when unset or empty
    pub fn read(&self) -> Option<String> {
        let value = match self {
            Credential::Env(name) => std::env::var(name).ok(),
            Credential::Fixed(value) => Some(value.clone()),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Human-readable origin, never the key itself
    pub fn source(&self) -> String {
        match self {
            Credential::Env(name) => format!("env:{}", name),
            Credential::Fixed(_) => "fixed".to_string(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.source())
    }
}
