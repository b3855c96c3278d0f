//! Bindable handler parameters
//!
//! Any type used as a handler parameter implements [`Param`]. The trait has
//! two halves: a static [`TypeDescriptor`] read once at registration, and
//! `materialize`, run for every request with the binding decided for it.
//!
//! # Example
//!
//! ```rust,ignore
//! use bindery_core::{Bind, Context};
//!
//! #[derive(Deserialize)]
//! struct CreateUser {
//!     name: String,
//! }
//!
//! impl Validate for CreateUser {}
//!
//! async fn create(ctx: Context, user: Bind<CreateUser>) -> Result<Json<User>, Status> {
//!     // ...
//! }
//! ```

use crate::binder::{Binder, Payload};
use crate::classify::{Capabilities, Strategy, TypeDescriptor};
use crate::context::{Context, RequestContext};
use crate::plan::ParameterBinding;
use crate::Error;
use bindery_validation::Validate;
use serde::de::DeserializeOwned;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// A type that can appear in a bound handler's parameter list.
pub trait Param: Sized + Send + 'static {
    /// Static description used by the classifier.
    fn descriptor() -> TypeDescriptor;

    /// Produce the value for one call.
    fn materialize(binding: &ParameterBinding, scope: &CallScope) -> Result<Self, Error>;
}

/// Everything a parameter may be bound from during one call.
#[derive(Clone)]
pub struct CallScope {
    context: Context,
    handle: RequestContext,
    binder: Arc<dyn Binder>,
}

impl CallScope {
    pub fn new(context: Context, handle: RequestContext, binder: Arc<dyn Binder>) -> Self {
        Self {
            context,
            handle,
            binder,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn handle(&self) -> &RequestContext {
        &self.handle
    }

    /// Extract the request payload with the configured binder.
    pub fn payload(&self) -> Result<Payload, Error> {
        self.binder.payload(self.handle.request())
    }

    /// Deserialize a fresh `T` from the payload and validate it.
    pub fn decode<T>(&self) -> Result<T, Error>
    where
        T: DeserializeOwned + Validate,
    {
        let value: T = self.payload()?.deserialize()?;
        value.validate()?;
        Ok(value)
    }
}

impl std::fmt::Debug for CallScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallScope")
            .field("request_id", &self.context.request_id())
            .field("handle", &self.handle)
            .finish()
    }
}

fn strategy_mismatch(binding: &ParameterBinding, expected: Strategy) -> Error {
    Error::Internal(format!(
        "parameter {} ({}) bound as {} but requires {}",
        binding.position,
        binding.target.type_name(),
        binding.strategy,
        expected
    ))
}

// ========== Ambient context ==========

impl Param for Context {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(Capabilities::AMBIENT)
    }

    fn materialize(binding: &ParameterBinding, scope: &CallScope) -> Result<Self, Error> {
        match binding.strategy {
            Strategy::AmbientContext => Ok(scope.context().clone()),
            _ => Err(strategy_mismatch(binding, Strategy::AmbientContext)),
        }
    }
}

// ========== Raw request handle ==========

impl Param for RequestContext {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(Capabilities::RAW_HANDLE)
    }

    fn materialize(binding: &ParameterBinding, scope: &CallScope) -> Result<Self, Error> {
        match binding.strategy {
            Strategy::RawRequestHandle => Ok(scope.handle().clone()),
            _ => Err(strategy_mismatch(binding, Strategy::RawRequestHandle)),
        }
    }
}

// ========== Deserialize and validate ==========

/// A value deserialized from the request payload and validated.
///
/// ```rust,ignore
/// async fn update(Bind(form): Bind<UpdateForm>) -> Status { /* ... */ }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Bind<T>(pub T);

impl<T> Bind<T> {
    /// Get the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Bind<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Bind<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> Param for Bind<T>
where
    T: DeserializeOwned + Validate + Send + 'static,
{
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(Capabilities::DESERIALIZE)
    }

    fn materialize(binding: &ParameterBinding, scope: &CallScope) -> Result<Self, Error> {
        match binding.strategy {
            Strategy::DeserializeValidate => scope.decode().map(Bind),
            _ => Err(strategy_mismatch(binding, Strategy::DeserializeValidate)),
        }
    }
}

// ========== Single-level pointer ==========

/// `Box<T>` binds like `T` but allocates through the box. Nesting boxes is
/// rejected at registration.
impl<T: Param> Param for Box<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::pointer_to::<Self>(T::descriptor())
    }

    fn materialize(binding: &ParameterBinding, scope: &CallScope) -> Result<Self, Error> {
        T::materialize(binding, scope).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::DefaultBinder;
    use crate::classify::classify;
    use crate::http::HttpRequest;
    use bindery_validation::{rules, ValidationErrors};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Login {
        username: String,
    }

    impl Validate for Login {
        fn validate(&self) -> Result<(), ValidationErrors> {
            rules::min_length(&self.username, 3, "username")
                .map_err(ValidationErrors::from)
        }
    }

    fn scope(request: HttpRequest) -> CallScope {
        CallScope::new(
            Context::new(),
            RequestContext::new(request),
            Arc::new(DefaultBinder),
        )
    }

    fn binding_for<P: Param>(position: usize) -> ParameterBinding {
        let target = P::descriptor();
        ParameterBinding {
            position,
            strategy: classify(&target).unwrap(),
            target,
            pointer_like: target.is_pointer_like(),
        }
    }

    #[test]
    fn test_context_binds_the_callers_value() {
        let scope = scope(HttpRequest::new("GET", "/"));
        let ctx = Context::materialize(&binding_for::<Context>(0), &scope).unwrap();
        assert_eq!(ctx.request_id(), scope.context().request_id());
    }

    #[test]
    fn test_request_context_is_the_live_handle() {
        let scope = scope(HttpRequest::new("GET", "/"));
        let handle =
            RequestContext::materialize(&binding_for::<RequestContext>(0), &scope).unwrap();
        handle.set_header("X-Seen", "1");
        assert!(!scope.handle().content_type_set());
        handle.respond(201, "text/plain", "hi");
        assert!(scope.handle().has_explicit_response());
    }

    #[test]
    fn test_bind_deserializes_and_validates() {
        let scope = scope(HttpRequest::new("POST", "/").with_json(r#"{"username":"alice"}"#));
        let Bind(login) = Bind::<Login>::materialize(&binding_for::<Bind<Login>>(0), &scope)
            .unwrap();
        assert_eq!(login.username, "alice");
    }

    #[test]
    fn test_bind_reports_validation_failure() {
        let scope = scope(HttpRequest::new("POST", "/").with_json(r#"{"username":"al"}"#));
        let err = Bind::<Login>::materialize(&binding_for::<Bind<Login>>(0), &scope).unwrap_err();
        match err {
            Error::Validation { details, .. } => assert_eq!(details.len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_bind_reports_malformed_payload() {
        let scope = scope(HttpRequest::new("POST", "/").with_json("{not json"));
        let err = Bind::<Login>::materialize(&binding_for::<Bind<Login>>(0), &scope).unwrap_err();
        assert!(err.is_binding_error());
    }

    #[test]
    fn test_box_allocates_through_pointer() {
        let binding = binding_for::<Box<Bind<Login>>>(1);
        assert!(binding.pointer_like);
        assert_eq!(binding.strategy, Strategy::DeserializeValidate);

        let scope = scope(HttpRequest::new("POST", "/").with_json(r#"{"username":"bob"}"#));
        let boxed = Box::<Bind<Login>>::materialize(&binding, &scope).unwrap();
        assert_eq!(boxed.username, "bob");
    }

    #[test]
    fn test_strategy_mismatch_is_internal_error() {
        let mut binding = binding_for::<Context>(0);
        binding.strategy = Strategy::DeserializeValidate;
        let scope = scope(HttpRequest::new("GET", "/"));
        let err = Context::materialize(&binding, &scope).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
