//! Secure types for handling sensitive data.
//!
//! This module provides types that prevent accidental exposure of secrets
//! through logging, debugging, or error messages, plus the value types the
//! resolver hands out.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string wrapper that redacts its contents in Debug, Display, and serialization.
///
/// - Debug output shows `SecretString([REDACTED])`
/// - Display output shows `[REDACTED]`
/// - Serialization outputs `"[REDACTED]"`
/// - Memory is zeroed when dropped
///
/// The value is only reachable through [`SecretString::expose_secret`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl SecretString {
    /// Creates a new SecretString from a string value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret without exposing the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Default for SecretString {
    fn default() -> Self {
        Self::new("")
    }
}

/// Logical name of a secret plus the environment variable backing it.
///
/// The mounted-store file is always named after [`SecretKey::name`]. The
/// environment variable defaults to the upper-cased name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretKey {
    name: String,
    env_var: String,
}

impl SecretKey {
    /// Key whose env var is the upper-cased name (`jwt_secret` -> `JWT_SECRET`).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let env_var = name.to_uppercase();
        Self { name, env_var }
    }

    /// Override the environment variable consulted on fallback.
    pub fn with_env_var(mut self, env_var: impl Into<String>) -> Self {
        self.env_var = env_var.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env_var(&self) -> &str {
        &self.env_var
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for SecretKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Which tier of the chain supplied a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretOrigin {
    MountedStore,
    Environment,
    Absent,
}

impl SecretOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretOrigin::MountedStore => "mounted-store",
            SecretOrigin::Environment => "environment",
            SecretOrigin::Absent => "absent",
        }
    }
}

impl fmt::Display for SecretOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved secret. `Absent` secrets carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    name: String,
    value: SecretString,
    origin: SecretOrigin,
}

impl Secret {
    pub fn new(name: impl Into<String>, value: SecretString, origin: SecretOrigin) -> Self {
        Self { name: name.into(), value, origin }
    }

    pub fn absent(name: impl Into<String>) -> Self {
        Self::new(name, SecretString::default(), SecretOrigin::Absent)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &SecretString {
        &self.value
    }

    pub fn origin(&self) -> SecretOrigin {
        self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// A required secret guaranteed non-empty.
///
/// Only [`crate::secrets::CredentialProvider`] constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    secret: Secret,
}

impl Credential {
    pub(crate) fn from_secret(secret: Secret) -> Option<Self> {
        if secret.is_empty() {
            None
        } else {
            Some(Self { secret })
        }
    }

    pub fn name(&self) -> &str {
        self.secret.name()
    }

    pub fn origin(&self) -> SecretOrigin {
        self.secret.origin()
    }

    pub fn expose_secret(&self) -> &str {
        self.secret.value().expose_secret()
    }
}

impl Deref for Credential {
    type Target = SecretString;

    fn deref(&self) -> &Self::Target {
        self.secret.value()
    }
}
