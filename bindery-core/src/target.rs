// Handler target shapes
//
// `Signature` is implemented for every async function or closure taking up
// to eight `Param` arguments and returning a `Reply`. The trait exposes the
// parameter descriptors for inspection and a monomorphized call taking the
// argument tuple.

use crate::classify::TypeDescriptor;
use crate::param::Param;
use crate::reply::Reply;
use std::future::Future;

/// A callable handler target taking the argument tuple `Args`.
pub trait Signature<Args>: Clone + Send + Sync + 'static {
    /// The target's return type.
    type Output: Reply;

    /// The future returned by `call`.
    type Future: Future<Output = Self::Output> + Send + 'static;

    /// Descriptors of the declared parameters, in declaration order.
    fn parameters() -> Vec<TypeDescriptor>;

    /// Call the target with already materialized arguments.
    fn call(&self, args: Args) -> Self::Future;
}

macro_rules! impl_signature {
    ($($ty:ident),*) => {
        impl<F, Fut, R, $($ty,)*> Signature<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: Reply,
            $($ty: Param,)*
        {
            type Output = R;
            type Future = Fut;

            fn parameters() -> Vec<TypeDescriptor> {
                vec![$($ty::descriptor()),*]
            }

            #[inline(always)]
            #[allow(non_snake_case)]
            fn call(&self, ($($ty,)*): ($($ty,)*)) -> Self::Future {
                (self)($($ty),*)
            }
        }
    };
}

impl_signature!();
impl_signature!(T1);
impl_signature!(T1, T2);
impl_signature!(T1, T2, T3);
impl_signature!(T1, T2, T3, T4);
impl_signature!(T1, T2, T3, T4, T5);
impl_signature!(T1, T2, T3, T4, T5, T6);
impl_signature!(T1, T2, T3, T4, T5, T6, T7);
impl_signature!(T1, T2, T3, T4, T5, T6, T7, T8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;

    fn arity<F: Signature<Args>, Args>(_f: &F) -> usize {
        F::parameters().len()
    }

    #[test]
    fn test_parameter_count_matches_declaration() {
        assert_eq!(arity(&|| async {}), 0);
        assert_eq!(arity(&|_: Context| async {}), 1);
        assert_eq!(
            arity(&|_: Context, _: Context, _: Context, _: Context| async {}),
            4
        );
        assert_eq!(
            arity(
                &|_: Context,
                  _: Context,
                  _: Context,
                  _: Context,
                  _: Context,
                  _: Context,
                  _: Context,
                  _: Context| async {}
            ),
            8
        );
    }

    #[tokio::test]
    async fn test_call_passes_arguments_in_order() {
        let target =
            |a: Context, b: Context| async move { format!("{}/{}", a.request_id(), b.request_id()) };
        let a = Context::new();
        let b = Context::new();
        let expected = format!("{}/{}", a.request_id(), b.request_id());
        assert_eq!(Signature::call(&target, (a, b)).await, expected);
    }
}
