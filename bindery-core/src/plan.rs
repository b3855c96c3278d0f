//! Binding plans.
//!
//! A [`BindingPlan`] is built once when a handler is registered and then
//! shared read-only by every request routed to it.

use crate::classify::{classify, Strategy, TypeDescriptor};
use crate::target::Signature;
use crate::Error;

/// How one parameter position is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterBinding {
    pub position: usize,
    pub strategy: Strategy,
    pub target: TypeDescriptor,
    pub pointer_like: bool,
}

/// Ordered per-position bindings of a handler's parameter list.
///
/// There are no mutating methods: the plan length always equals the
/// handler's parameter count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingPlan {
    bindings: Vec<ParameterBinding>,
}

impl BindingPlan {
    /// Classify each descriptor in declaration order.
    pub fn from_descriptors(descriptors: &[TypeDescriptor]) -> Result<Self, Error> {
        let bindings = descriptors
            .iter()
            .enumerate()
            .map(|(position, target)| {
                let strategy = classify(target).map_err(|e| match e {
                    Error::InvalidTarget(msg) => {
                        Error::InvalidTarget(format!("parameter {}: {}", position, msg))
                    }
                    other => other,
                })?;
                Ok(ParameterBinding {
                    position,
                    strategy,
                    target: *target,
                    pointer_like: target.is_pointer_like(),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self { bindings })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ParameterBinding> {
        self.bindings.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterBinding> {
        self.bindings.iter()
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }
}

impl<'a> IntoIterator for &'a BindingPlan {
    type Item = &'a ParameterBinding;
    type IntoIter = std::slice::Iter<'a, ParameterBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

/// Build the binding plan of a handler.
///
/// Fails with [`Error::InvalidTarget`] when a parameter shape is not
/// supported. This is a registration error and should abort startup.
pub fn inspect<F, Args>(_target: &F) -> Result<BindingPlan, Error>
where
    F: Signature<Args>,
{
    BindingPlan::from_descriptors(&F::parameters())
}
