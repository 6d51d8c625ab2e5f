//! The tier trait the resolver chains together.

use async_trait::async_trait;

use super::error::Result;
use super::types::{SecretKey, SecretOrigin};

/// One tier of the secret fallback chain.
///
/// # Security Considerations
///
/// - Implementations MUST NOT log secret values
/// - Errors MUST NOT embed secret values
///
/// # Example Implementation
///
/// ```rust,ignore
/// use service_guard::secrets::{Result, SecretKey, SecretOrigin, SecretSource};
/// use async_trait::async_trait;
///
/// struct StaticSource(&'static str);
///
/// #[async_trait]
/// impl SecretSource for StaticSource {
///     fn origin(&self) -> SecretOrigin {
///         SecretOrigin::Environment
///     }
///
///     async fn fetch(&self, key: &SecretKey) -> Result<String> {
///         Ok(self.0.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Origin recorded on secrets this tier supplies.
    fn origin(&self) -> SecretOrigin;

    /// Fetch the raw value for `key`.
    ///
    /// # Errors
    ///
    /// [`super::SecretsError::Unavailable`] when this tier cannot supply it.
    async fn fetch(&self, key: &SecretKey) -> Result<String>;
}
