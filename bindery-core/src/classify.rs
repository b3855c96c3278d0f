//! Type classification.
//!
//! Every bindable parameter type describes itself with a [`TypeDescriptor`];
//! [`classify`] turns that description into the [`Strategy`] used to
//! produce the argument at request time.
//!
//! When a type advertises more than one capability the precedence is fixed:
//! ambient context, then raw request handle, then deserialize-and-validate.

use crate::{Error, RequestContext};
use std::any::TypeId;
use std::fmt;

/// How a parameter value is produced for each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Bind the caller-supplied ambient [`Context`](crate::Context).
    AmbientContext,
    /// Bind the live [`RequestContext`].
    RawRequestHandle,
    /// Allocate a fresh value and fill it from the request payload.
    DeserializeValidate,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::AmbientContext => "ambient-context",
            Strategy::RawRequestHandle => "raw-request-handle",
            Strategy::DeserializeValidate => "deserialize-validate",
        })
    }
}

/// Capabilities a parameter type claims to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub ambient: bool,
    pub raw_handle: bool,
    pub deserialize: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        ambient: false,
        raw_handle: false,
        deserialize: false,
    };
    pub const AMBIENT: Self = Self {
        ambient: true,
        ..Self::NONE
    };
    pub const RAW_HANDLE: Self = Self {
        raw_handle: true,
        ..Self::NONE
    };
    pub const DESERIALIZE: Self = Self {
        deserialize: true,
        ..Self::NONE
    };

    pub const fn union(self, other: Self) -> Self {
        Self {
            ambient: self.ambient || other.ambient,
            raw_handle: self.raw_handle || other.raw_handle,
            deserialize: self.deserialize || other.deserialize,
        }
    }
}

/// Opaque description of a declared parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    type_name: &'static str,
    type_id: TypeId,
    pointee_id: TypeId,
    depth: u8,
    capabilities: Capabilities,
}

impl TypeDescriptor {
    /// Describe a plain value type.
    pub fn of<T: 'static>(capabilities: Capabilities) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            pointee_id: TypeId::of::<T>(),
            depth: 0,
            capabilities,
        }
    }

    /// Describe `P`, a pointer to the type described by `inner`.
    pub fn pointer_to<P: 'static>(inner: TypeDescriptor) -> Self {
        Self {
            type_name: std::any::type_name::<P>(),
            type_id: TypeId::of::<P>(),
            pointee_id: inner.pointee_id,
            depth: inner.depth.saturating_add(1),
            capabilities: inner.capabilities,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// `TypeId` of the value behind all indirections.
    pub fn pointee_id(&self) -> TypeId {
        self.pointee_id
    }

    /// Levels of indirection; 0 for a value, 1 for `Box<T>`.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn is_pointer_like(&self) -> bool {
        self.depth > 0
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

/// Decide the binding strategy for a parameter.
///
/// Pure and deterministic. Fails only for more than one level of
/// indirection, which is a registration error.
pub fn classify(descriptor: &TypeDescriptor) -> Result<Strategy, Error> {
    if descriptor.depth > 1 {
        return Err(Error::InvalidTarget(format!(
            "parameter type `{}` uses {} levels of indirection; at most one is supported",
            descriptor.type_name, descriptor.depth
        )));
    }

    let caps = descriptor.capabilities;
    if caps.ambient {
        Ok(Strategy::AmbientContext)
    } else if caps.raw_handle && descriptor.pointee_id == TypeId::of::<RequestContext>() {
        Ok(Strategy::RawRequestHandle)
    } else {
        Ok(Strategy::DeserializeValidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;

    struct Payload;
    struct FakeHandle;

    #[test]
    fn test_context_is_ambient() {
        let d = TypeDescriptor::of::<Context>(Capabilities::AMBIENT);
        assert_eq!(classify(&d).unwrap(), Strategy::AmbientContext);
    }

    #[test]
    fn test_raw_handle_requires_exact_type() {
        let d = TypeDescriptor::of::<RequestContext>(Capabilities::RAW_HANDLE);
        assert_eq!(classify(&d).unwrap(), Strategy::RawRequestHandle);

        let d = TypeDescriptor::of::<FakeHandle>(Capabilities::RAW_HANDLE);
        assert_eq!(classify(&d).unwrap(), Strategy::DeserializeValidate);
    }

    #[test]
    fn test_ambient_wins_over_deserialize() {
        let caps = Capabilities::AMBIENT.union(Capabilities::DESERIALIZE);
        let d = TypeDescriptor::of::<Payload>(caps);
        assert_eq!(classify(&d).unwrap(), Strategy::AmbientContext);
    }

    #[test]
    fn test_single_pointer_is_accepted() {
        let inner = TypeDescriptor::of::<Payload>(Capabilities::DESERIALIZE);
        let d = TypeDescriptor::pointer_to::<Box<Payload>>(inner);
        assert!(d.is_pointer_like());
        assert_eq!(d.pointee_id(), TypeId::of::<Payload>());
        assert_eq!(classify(&d).unwrap(), Strategy::DeserializeValidate);
    }

    #[test]
    fn test_double_pointer_is_rejected() {
        let inner = TypeDescriptor::of::<Payload>(Capabilities::DESERIALIZE);
        let once = TypeDescriptor::pointer_to::<Box<Payload>>(inner);
        let twice = TypeDescriptor::pointer_to::<Box<Box<Payload>>>(once);
        let err = classify(&twice).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let d = TypeDescriptor::of::<Payload>(Capabilities::NONE);
        assert_eq!(classify(&d).unwrap(), classify(&d).unwrap());
        assert_eq!(classify(&d).unwrap(), Strategy::DeserializeValidate);
    }
}
