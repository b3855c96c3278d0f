//! Handler invocation.

use crate::reply::{Reply, ReturnValue};
use crate::target::Signature;
use crate::{Error, Status};

/// Raw output of one handler call, before normalization.
#[derive(Debug, Default)]
pub struct InvocationResult {
    values: Vec<ReturnValue>,
}

impl InvocationResult {
    pub fn new(values: Vec<ReturnValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[ReturnValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<ReturnValue> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The error carried by the trailing slot, if it is a non-nil error.
    pub fn error(&self) -> Option<&Status> {
        match self.values.last() {
            Some(ReturnValue::Error(status)) => status.as_ref(),
            _ => None,
        }
    }
}

/// Call `target` and collect its return values.
///
/// Panics raised by the target propagate to the caller.
pub async fn invoke<F, Args>(target: &F, args: Args) -> Result<InvocationResult, Error>
where
    F: Signature<Args>,
{
    let output = target.call(args).await;
    output.into_values().map(InvocationResult::new)
}
