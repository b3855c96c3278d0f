//! Core of the Bindery handler adapter.
//!
//! Bindery turns ordinary async functions into uniform request handlers.
//! Each function is inspected once at registration, producing a
//! [`BindingPlan`]; every request then materializes the arguments, invokes
//! the function and normalizes whatever it returned into a single
//! [`Envelope`]. Binding failures, business errors and panics all end up in
//! the same error envelope, always answered with HTTP 200.
//!
//! ```rust,ignore
//! use bindery_core::*;
//!
//! async fn show(ctx: Context, Bind(query): Bind<UserQuery>) -> Result<Json<User>, Status> {
//!     let user = find_user(&query).await.ok_or_else(|| Status::new("NOT_FOUND", "no such user"))?;
//!     Ok(Json(user))
//! }
//!
//! let mut router = Router::new();
//! router.get("/users", show)?;
//! let response = router.route(HttpRequest::new("GET", "/users?id=7")).await;
//! ```

pub mod binder;
pub mod classify;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod extensions;
pub mod funnel;
pub mod handler;
pub mod http;
pub mod invoke;
pub mod logging;
pub mod materialize;
pub mod normalize;
pub mod param;
pub mod plan;
pub mod reply;
pub mod routing;
pub mod status;
pub mod target;

pub use binder::{Binder, DefaultBinder, Payload};
pub use classify::{classify, Capabilities, Strategy, TypeDescriptor};
pub use config::{AdapterConfig, EnvelopeStyle};
pub use context::{Context, RequestContext};
pub use envelope::{Envelope, ErrorInfo};
pub use error::{Error, Result};
pub use extensions::Extensions;
pub use funnel::{panic_to_error, Call, EnvelopeFunnel, Funnel};
pub use handler::{bind, Adapter, BindHandler, BoxedHandler, Handler};
pub use http::{mime, HttpRequest, HttpResponse, CONTENT_TYPE};
pub use invoke::{invoke, InvocationResult};
pub use materialize::{materialize, FromPlan};
pub use normalize::normalize;
pub use param::{Bind, CallScope, Param};
pub use plan::{inspect, BindingPlan, ParameterBinding};
pub use reply::{Json, Reply, ReplyValue, ReturnValue};
pub use routing::{HttpMethod, Route, Router};
pub use status::{ErrorCode, Status};
pub use target::Signature;
