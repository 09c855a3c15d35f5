//! Execution seam.
//!
//! The crate never talks to a document store itself. A [`QueryTransport`]
//! is injected by the caller: it receives the finished query text and named
//! parameters and returns raw JSON. [`QueryNode::run`] then validates that
//! JSON with the node's validator.
//!
//! # Example
//!
//! ```rust
//! use shapeql::{Projection, QueryNode, QueryTransport, Shape, TransportError};
//! use serde_json::{json, Map, Value};
//!
//! struct Fixture(Value);
//!
//! impl QueryTransport for Fixture {
//!     fn fetch(&self, _query: &str, _params: &Map<String, Value>) -> Result<Value, TransportError> {
//!         Ok(self.0.clone())
//!     }
//! }
//!
//! let query = QueryNode::new()
//!     .star()
//!     .project(Projection::new().field("name", Shape::string()))
//!     .unwrap();
//!
//! let store = Fixture(json!([{"name": "Lamp", "price": 3}]));
//! let rows = query.run(&store, &Map::new()).unwrap();
//! assert_eq!(rows, json!([{"name": "Lamp"}]));
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{QueryError, TransportError};
use crate::query::QueryNode;

/// Executes query text against a document store.
pub trait QueryTransport {
    /// Runs `query` with `params`, returning the raw result.
    fn fetch(&self, query: &str, params: &Map<String, Value>) -> Result<Value, TransportError>;
}

impl<T: QueryTransport + ?Sized> QueryTransport for &T {
    fn fetch(&self, query: &str, params: &Map<String, Value>) -> Result<Value, TransportError> {
        (**self).fetch(query, params)
    }
}

impl QueryNode {
    /// Fetches this query through `transport` and validates the result.
    pub fn run<T: QueryTransport + ?Sized>(
        &self,
        transport: &T,
        params: &Map<String, Value>,
    ) -> Result<Value, QueryError> {
        debug!(query = %self.query(), params = params.len(), "running query");
        let raw = transport
            .fetch(self.query(), params)
            .map_err(QueryError::Transport)?;
        self.parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Failing;

    impl QueryTransport for Failing {
        fn fetch(&self, _query: &str, _params: &Map<String, Value>) -> Result<Value, TransportError> {
            Err("connection refused".into())
        }
    }

    #[test]
    fn test_transport_failure_is_wrapped() {
        let error = QueryNode::new().star().run(&Failing, &Map::new()).unwrap_err();
        assert!(matches!(error, QueryError::Transport(_)));
        assert_eq!(error.to_string(), "query transport failed: connection refused");
    }

    #[test]
    fn test_reference_transport() {
        struct Echo;
        impl QueryTransport for Echo {
            fn fetch(&self, query: &str, _params: &Map<String, Value>) -> Result<Value, TransportError> {
                Ok(json!(query))
            }
        }
        let echo = Echo;
        let by_ref: &dyn QueryTransport = &echo;
        assert_eq!(QueryNode::new().star().run(&by_ref, &Map::new()).unwrap(), json!("*"));
    }
}
