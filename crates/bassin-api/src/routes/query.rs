//! # Query-String Extraction
//!
//! Filters are read from the query string as ordered pairs. A key given more
//! than once is not an error: the first occurrence wins and later ones are
//! ignored, so `?bassin=Mais&bassin=Cacao` filters on `Mais`.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use crate::error::AppError;

/// The request's query string as `(key, value)` pairs, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// First value given for `key`, if any.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Owned copy of [`first`](Self::first).
    pub fn first_owned(&self, key: &str) -> Option<String> {
        self.first(key).map(str::to_string)
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for QueryPairs {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state).await?;
        Ok(Self(pairs))
    }
}
