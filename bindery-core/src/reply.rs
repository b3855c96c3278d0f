//! Handler return shapes.
//!
//! A handler's return type implements [`Reply`], which flattens it into the
//! ordered [`ReturnValue`]s the normalizer works on. Each slot of a tuple
//! implements [`ReplyValue`].
//!
//! | return type                       | values                                  |
//! |-----------------------------------|-----------------------------------------|
//! | `()`                              | none                                    |
//! | `Json<T>`, `String`, scalars, ... | one data value                          |
//! | `Envelope`                        | one envelope, passed through            |
//! | `Status`, `Error`                 | one error                               |
//! | `Option<Status>`                  | one error slot, possibly nil            |
//! | `(A, B, ...)`                     | one value per element                   |
//! | `Result<T, E>`                    | `T`'s values followed by an error slot  |

use crate::envelope::Envelope;
use crate::{Error, Status};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;

/// One raw return value of a handler call.
#[derive(Debug)]
pub enum ReturnValue {
    /// A plain data value.
    Data(Value),
    /// A ready-made envelope.
    Envelope(Envelope),
    /// An error-typed slot; `None` is a nil error.
    Error(Option<Status>),
}

impl ReturnValue {
    /// Serialize any value into a data slot.
    pub fn data<T: Serialize>(value: &T) -> Result<Self, Error> {
        Ok(ReturnValue::Data(serde_json::to_value(value)?))
    }

    pub fn is_error_typed(&self) -> bool {
        matches!(self, ReturnValue::Error(_))
    }

    /// An error slot holding an actual error.
    pub fn is_failure(&self) -> bool {
        matches!(self, ReturnValue::Error(Some(_)))
    }
}

/// A single return slot.
pub trait ReplyValue {
    fn into_value(self) -> Result<ReturnValue, Error>;
}

/// A complete handler return type.
pub trait Reply: Sized {
    /// Number of values `into_values` produces.
    const ARITY: usize;

    fn into_values(self) -> Result<Vec<ReturnValue>, Error>;
}

// ========== JSON data ==========

/// Serializes `T` as the envelope's data.
///
/// ```rust,ignore
/// async fn show(ctx: Context) -> Result<Json<User>, Status> {
///     Ok(Json(User { name: "a".into() }))
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Serialize> ReplyValue for Json<T> {
    fn into_value(self) -> Result<ReturnValue, Error> {
        ReturnValue::data(&self.0)
    }
}

impl<T: Serialize> ReplyValue for Vec<T> {
    fn into_value(self) -> Result<ReturnValue, Error> {
        ReturnValue::data(&self)
    }
}

impl<T: Serialize> ReplyValue for HashMap<String, T> {
    fn into_value(self) -> Result<ReturnValue, Error> {
        ReturnValue::data(&self)
    }
}

impl<T: Serialize> ReplyValue for BTreeMap<String, T> {
    fn into_value(self) -> Result<ReturnValue, Error> {
        ReturnValue::data(&self)
    }
}

impl ReplyValue for Value {
    fn into_value(self) -> Result<ReturnValue, Error> {
        Ok(ReturnValue::Data(self))
    }
}

macro_rules! impl_scalar_value {
    ($($t:ty),*) => {
        $(
            impl ReplyValue for $t {
                fn into_value(self) -> Result<ReturnValue, Error> {
                    Ok(ReturnValue::Data(Value::from(self)))
                }
            }
        )*
    };
}

impl_scalar_value!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, &'static str
);

// ========== Envelopes and errors ==========

impl ReplyValue for Envelope {
    fn into_value(self) -> Result<ReturnValue, Error> {
        Ok(ReturnValue::Envelope(self))
    }
}

impl ReplyValue for Status {
    fn into_value(self) -> Result<ReturnValue, Error> {
        Ok(ReturnValue::Error(Some(self)))
    }
}

impl ReplyValue for Error {
    fn into_value(self) -> Result<ReturnValue, Error> {
        Ok(ReturnValue::Error(Some(Status::from(self))))
    }
}

impl ReplyValue for Option<Status> {
    fn into_value(self) -> Result<ReturnValue, Error> {
        Ok(ReturnValue::Error(self))
    }
}

// ========== Whole return types ==========

impl Reply for () {
    const ARITY: usize = 0;

    fn into_values(self) -> Result<Vec<ReturnValue>, Error> {
        Ok(Vec::new())
    }
}

macro_rules! impl_single_reply {
    ($(impl<$($g:ident),*> for $t:ty;)*) => {
        $(
            impl<$($g: Serialize),*> Reply for $t {
                const ARITY: usize = 1;

                fn into_values(self) -> Result<Vec<ReturnValue>, Error> {
                    Ok(vec![self.into_value()?])
                }
            }
        )*
    };
}

impl_single_reply! {
    impl<T> for Json<T>;
    impl<T> for Vec<T>;
    impl<T> for HashMap<String, T>;
    impl<T> for BTreeMap<String, T>;
    impl<> for Value;
    impl<> for Envelope;
    impl<> for Status;
    impl<> for Error;
    impl<> for Option<Status>;
    impl<> for bool;
    impl<> for i8;
    impl<> for i16;
    impl<> for i32;
    impl<> for i64;
    impl<> for isize;
    impl<> for u8;
    impl<> for u16;
    impl<> for u32;
    impl<> for u64;
    impl<> for usize;
    impl<> for f32;
    impl<> for f64;
    impl<> for String;
    impl<> for &'static str;
}

macro_rules! impl_tuple_reply {
    ($len:expr; $($ty:ident),+) => {
        impl<$($ty: ReplyValue,)+> Reply for ($($ty,)+) {
            const ARITY: usize = $len;

            #[allow(non_snake_case)]
            fn into_values(self) -> Result<Vec<ReturnValue>, Error> {
                let ($($ty,)+) = self;
                Ok(vec![$($ty.into_value()?),+])
            }
        }
    };
}

impl_tuple_reply!(2; A, B);
impl_tuple_reply!(3; A, B, C);
impl_tuple_reply!(4; A, B, C, D);
impl_tuple_reply!(5; A, B, C, D, E);
impl_tuple_reply!(6; A, B, C, D, E, F);
impl_tuple_reply!(7; A, B, C, D, E, F, G);
impl_tuple_reply!(8; A, B, C, D, E, F, G, H);

/// Trailing-error convention: `Ok(t)` yields `t`'s values followed by a nil
/// error, `Err(e)` yields placeholders followed by the error.
impl<T, E> Reply for Result<T, E>
where
    T: Reply,
    E: Into<Status>,
{
    const ARITY: usize = T::ARITY + 1;

    fn into_values(self) -> Result<Vec<ReturnValue>, Error> {
        match self {
            Ok(value) => {
                let mut values = value.into_values()?;
                values.push(ReturnValue::Error(None));
                Ok(values)
            }
            Err(err) => {
                let mut values: Vec<ReturnValue> = (0..T::ARITY)
                    .map(|_| ReturnValue::Data(Value::Null))
                    .collect();
                values.push(ReturnValue::Error(Some(err.into())));
                Ok(values)
            }
        }
    }
}
