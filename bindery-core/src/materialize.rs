//! Parameter materialization.
//!
//! Executes a [`BindingPlan`] for one call. Positions are bound in order and
//! the first failure stops the run: later positions are never bound and the
//! partially built argument tuple is dropped.

use crate::param::{CallScope, Param};
use crate::plan::{BindingPlan, ParameterBinding};
use crate::Error;

/// An argument tuple that can be produced from a binding plan.
pub trait FromPlan: Sized + Send + 'static {
    /// Number of positions in the tuple.
    const LEN: usize;

    fn from_plan(plan: &BindingPlan, scope: &CallScope) -> Result<Self, Error>;
}

/// Produce the argument tuple for one call.
pub fn materialize<Args: FromPlan>(plan: &BindingPlan, scope: &CallScope) -> Result<Args, Error> {
    if plan.len() != Args::LEN {
        return Err(Error::Internal(format!(
            "binding plan has {} positions but the target takes {}",
            plan.len(),
            Args::LEN
        )));
    }
    Args::from_plan(plan, scope)
}

fn binding_at(plan: &BindingPlan, position: usize) -> Result<&ParameterBinding, Error> {
    plan.get(position)
        .ok_or_else(|| Error::Internal(format!("no binding for parameter {}", position)))
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $(, $tail:ident)*) => { 1usize + count!($($tail),*) };
}

macro_rules! impl_from_plan {
    ($($ty:ident => $idx:tt),*) => {
        impl<$($ty: Param,)*> FromPlan for ($($ty,)*) {
            const LEN: usize = count!($($ty),*);

            #[allow(unused_variables)]
            fn from_plan(plan: &BindingPlan, scope: &CallScope) -> Result<Self, Error> {
                Ok(($($ty::materialize(binding_at(plan, $idx)?, scope)?,)*))
            }
        }
    };
}

impl_from_plan!();
impl_from_plan!(T1 => 0);
impl_from_plan!(T1 => 0, T2 => 1);
impl_from_plan!(T1 => 0, T2 => 1, T3 => 2);
impl_from_plan!(T1 => 0, T2 => 1, T3 => 2, T4 => 3);
impl_from_plan!(T1 => 0, T2 => 1, T3 => 2, T4 => 3, T5 => 4);
impl_from_plan!(T1 => 0, T2 => 1, T3 => 2, T4 => 3, T5 => 4, T6 => 5);
impl_from_plan!(T1 => 0, T2 => 1, T3 => 2, T4 => 3, T5 => 4, T6 => 5, T7 => 6);
impl_from_plan!(T1 => 0, T2 => 1, T3 => 2, T4 => 3, T5 => 4, T6 => 5, T7 => 6, T8 => 7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::DefaultBinder;
    use crate::classify::{Capabilities, TypeDescriptor};
    use crate::http::HttpRequest;
    use crate::plan::inspect;
    use crate::{Bind, Context, RequestContext};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    static PROBE_BOUND: AtomicUsize = AtomicUsize::new(0);

    /// Counts how many times it was bound.
    #[derive(Debug)]
    struct Probe;

    impl Param for Probe {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::of::<Self>(Capabilities::DESERIALIZE)
        }

        fn materialize(_: &ParameterBinding, _: &CallScope) -> Result<Self, Error> {
            PROBE_BOUND.fetch_add(1, Ordering::SeqCst);
            Ok(Probe)
        }
    }

    fn scope(request: HttpRequest) -> CallScope {
        CallScope::new(
            Context::new(),
            RequestContext::new(request),
            Arc::new(DefaultBinder),
        )
    }

    #[test]
    fn test_zero_parameters_is_trivially_successful() {
        let plan = inspect(&|| async {}).unwrap();
        let args: () = materialize(&plan, &scope(HttpRequest::new("GET", "/"))).unwrap();
        assert_eq!(args, ());
    }

    #[test]
    fn test_binds_every_position() {
        let plan = inspect(&|_: Context, _: RequestContext, _: Bind<Value>| async {}).unwrap();
        let scope = scope(HttpRequest::new("POST", "/").with_json(r#"{"a":1}"#));
        let (ctx, raw, Bind(body)): (Context, RequestContext, Bind<Value>) =
            materialize(&plan, &scope).unwrap();
        assert_eq!(ctx.request_id(), scope.context().request_id());
        assert_eq!(raw.path(), "/");
        assert_eq!(body["a"], 1);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let plan = inspect(&|_: Context, _: Bind<Value>, _: Probe| async {}).unwrap();
        let scope = scope(HttpRequest::new("POST", "/").with_json("{broken"));
        let before = PROBE_BOUND.load(Ordering::SeqCst);

        let result: Result<(Context, Bind<Value>, Probe), Error> = materialize(&plan, &scope);

        assert!(result.unwrap_err().is_binding_error());
        assert_eq!(PROBE_BOUND.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_plan_length_mismatch() {
        let plan = inspect(&|_: Context| async {}).unwrap();
        let result: Result<(Context, Context), Error> =
            materialize(&plan, &scope(HttpRequest::new("GET", "/")));
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
