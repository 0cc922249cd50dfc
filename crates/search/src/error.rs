use thiserror::Error;

/// Boxed error from a store collaborator.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type SearchResult<T> = Result<T, SearchError>;

/// Why a key search failed.
///
/// | Error | Fault | Transport mapping |
/// |-------|-------|-------------------|
/// | [`InvalidPattern`](SearchError::InvalidPattern) | caller input | 400 |
/// | [`ReferenceConstructionFailed`](SearchError::ReferenceConstructionFailed) | internal defect | 500 |
/// | [`StoreFetchFailed`](SearchError::StoreFetchFailed) | store / environment | 500 |
///
/// None of them carries a partial result.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to build key reference for '{path}': {source}")]
    ReferenceConstructionFailed {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to fetch keys below '{root}': {source}")]
    StoreFetchFailed {
        root: String,
        #[source]
        source: StoreError,
    },
}

impl SearchError {
    /// `true` when the caller sent bad input; everything else is a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SearchError::InvalidPattern { .. })
    }
}
