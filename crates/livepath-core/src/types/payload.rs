//! Serialized path values.

use std::sync::Arc;

/// A serialized JSON value as produced by a path.
///
/// Reference counted so one recomputation can be handed to the cache,
/// several coalesced callers, and the broadcast sink without copying.
pub type Payload = Arc<str>;
