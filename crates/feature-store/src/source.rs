use async_trait::async_trait;
use wfs_common::WfsResult;
use wfs_protocol::{FeatureQuery, FeatureRow};

/// Trait for the data source behind GetFeature.
///
/// Implementations bind `FeatureQuery::params` positionally: the value at
/// index `i` fills placeholder `?{i + 1}`.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Bring the store up to date with its backing data.
    ///
    /// With `force_full = false` this is cheap when nothing changed.
    async fn refresh(&self, force_full: bool) -> WfsResult<()>;

    /// Run a row-selecting query.
    async fn query_feature_package(&self, query: &FeatureQuery) -> WfsResult<Vec<FeatureRow>>;

    /// Run an aggregate query and read its single count value.
    async fn count_features(&self, query: &FeatureQuery) -> WfsResult<u64>;

    /// Check that the store can answer queries (readiness).
    async fn ping(&self) -> WfsResult<()>;
}
