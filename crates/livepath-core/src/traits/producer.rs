//! Data producer trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;

/// Computes the current value of a registered path.
///
/// Producers are invoked repeatedly on the broadcast timer, so they must be
/// safe to call again at any time. Failures are reported per invocation and
/// never poison the producer.
#[async_trait]
pub trait Producer: Send + Sync + std::fmt::Debug + 'static {
    /// Short name of the producer implementation, shown in the path listing.
    fn kind(&self) -> &'static str;

    /// Compute the current value.
    async fn produce(&self) -> AppResult<Value>;
}
