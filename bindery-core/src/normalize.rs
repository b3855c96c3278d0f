//! Response normalization.
//!
//! Maps the raw return values of one call to a single [`Envelope`]:
//!
//! - no values: empty success
//! - one value: an error becomes an error envelope (a nil error is an empty
//!   success), an envelope passes through unchanged, anything else is the
//!   success data
//! - several values: a non-nil trailing error becomes an error envelope and
//!   the preceding values are dropped; a nil trailing error makes the
//!   preceding values the data (a single value as itself, several as an
//!   array); without a trailing error slot all values form the data array

use crate::envelope::{Envelope, ErrorInfo};
use crate::invoke::InvocationResult;
use crate::reply::ReturnValue;
use serde_json::Value;

/// Normalize the result of one call.
pub fn normalize(result: InvocationResult) -> Envelope {
    normalize_values(result.into_values())
}

pub fn normalize_values(mut values: Vec<ReturnValue>) -> Envelope {
    match values.len() {
        0 => Envelope::empty(),
        1 => match values.pop() {
            Some(value) => single(value),
            None => Envelope::empty(),
        },
        _ => match values.pop() {
            Some(ReturnValue::Error(Some(status))) => Envelope::failure(status),
            Some(ReturnValue::Error(None)) => {
                if values.len() == 1 {
                    match values.remove(0) {
                        ReturnValue::Envelope(envelope) => envelope,
                        value => Envelope::success(into_data(value)),
                    }
                } else {
                    Envelope::success(Value::Array(values.into_iter().map(into_data).collect()))
                }
            }
            Some(last) => {
                values.push(last);
                Envelope::success(Value::Array(values.into_iter().map(into_data).collect()))
            }
            None => Envelope::empty(),
        },
    }
}

fn single(value: ReturnValue) -> Envelope {
    match value {
        ReturnValue::Error(Some(status)) => Envelope::failure(status),
        ReturnValue::Error(None) => Envelope::empty(),
        ReturnValue::Envelope(envelope) => envelope,
        ReturnValue::Data(data) => Envelope::success(data),
    }
}

/// A value's JSON form when it is part of the data.
fn into_data(value: ReturnValue) -> Value {
    match value {
        ReturnValue::Data(data) => data,
        ReturnValue::Envelope(envelope) => serde_json::to_value(envelope).unwrap_or(Value::Null),
        ReturnValue::Error(None) => Value::Null,
        ReturnValue::Error(Some(status)) => {
            serde_json::to_value(ErrorInfo::from(&status)).unwrap_or(Value::Null)
        }
    }
}
