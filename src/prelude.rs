pub use crate::builder::{new_cache, CacheBuilder, Policy};
pub use crate::error::{CacheFull, GetError, UpstreamError};
pub use crate::expiry::Expiry;
pub use crate::metrics::MetricsSnapshot;
pub use crate::policy::{FifoCache, LfuCache, LruCache, TtlCache};
pub use crate::store::Store;
pub use crate::traits::Cache;
pub use crate::upstream::{Blocking, FetchOutcome, Proxy, StaticUpstream, Upstream, UpstreamFn};
