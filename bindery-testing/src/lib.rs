//! Testing utilities for Bindery handlers.
//!
//! [`TestClient`] routes requests through a [`Router`](bindery_core::Router)
//! in-process; [`TestResponse`] decodes the envelope and offers
//! assertions on it.
//!
//! ```no_run
//! use bindery_core::{Context, Json, Router, Status};
//! use bindery_testing::*;
//!
//! # tokio_test::block_on(async {
//! let mut router = Router::new();
//! router
//!     .get("/hello", |_ctx: Context| async { Ok::<_, Status>(Json("hi")) })
//!     .unwrap();
//!
//! let client = TestClient::new(router);
//! let data = client.get("/hello").await.assert_success();
//! assert_eq!(data, "hi");
//! # });
//! ```

mod assertions;
mod test_client;

pub use assertions::*;
pub use test_client::*;
