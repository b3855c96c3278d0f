// Bindery - turn ordinary async functions into uniform HTTP handlers
//
// Handlers declare what they need as parameters and return whatever shape is
// natural; Bindery binds the parameters, normalizes the return values and
// answers every request with exactly one JSON envelope.

// Re-export core functionality
pub use bindery_core::*;

// Re-export the validation collaborator
pub use bindery_validation as validation;
pub use bindery_validation::{Checks, FieldRules, Validate, ValidationError, ValidationErrors, rules};

#[cfg(feature = "testing")]
pub use bindery_testing as testing;

/// Commonly used types.
///
/// ```
/// use bindery::prelude::*;
///
/// async fn hello(_ctx: Context) -> Result<Json<&'static str>, Status> {
///     Ok(Json("hello"))
/// }
///
/// let mut router = Router::new();
/// router.get("/hello", hello).unwrap();
/// ```
pub mod prelude {
    pub use crate::{
        Adapter, AdapterConfig, Bind, Context, Envelope, EnvelopeStyle, Error, ErrorInfo,
        Handler, HttpMethod, HttpRequest, HttpResponse, Json, Param, RequestContext, Router,
        Status, Validate, ValidationErrors, bind, status,
    };
}
