use alloc::sync::Arc;
use core::any::{Any, type_name};

use crate::error::{AccessError, BoxedError};
use crate::value::{FromValue, IntoValue, ToValue, Value};

// -----------------------------------------------------------------------------
// Traits

/// Reads one member of a target object.
pub trait Getter: Send + Sync + 'static {
    fn get<'a>(&self, target: &'a dyn Any) -> Result<Value<'a>, AccessError>;
}

/// Writes one member of a target object.
pub trait Setter: Send + Sync + 'static {
    fn set(&self, target: &mut dyn Any, value: Value<'static>) -> Result<(), AccessError>;
}

/// Projects a derived object onto its embedded base object.
pub trait Upcast: Send + Sync + 'static {
    fn upcast<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any>;
    fn upcast_mut<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

#[inline]
fn downcast<T: Any>(target: &dyn Any) -> Result<&T, AccessError> {
    target.downcast_ref::<T>().ok_or(AccessError::TargetMismatch {
        expected: type_name::<T>(),
    })
}

#[inline]
fn downcast_mut<T: Any>(target: &mut dyn Any) -> Result<&mut T, AccessError> {
    target.downcast_mut::<T>().ok_or(AccessError::TargetMismatch {
        expected: type_name::<T>(),
    })
}

// -----------------------------------------------------------------------------
// Function pointer accessors

pub(super) struct FieldGet<T, F> {
    pub get: fn(&T) -> &F,
}

impl<T: Any, F: ToValue + 'static> Getter for FieldGet<T, F> {
    fn get<'a>(&self, target: &'a dyn Any) -> Result<Value<'a>, AccessError> {
        Ok((self.get)(downcast::<T>(target)?).to_value())
    }
}

pub(super) struct FieldSet<T, F> {
    pub get_mut: fn(&mut T) -> &mut F,
}

impl<T: Any, F: FromValue + 'static> Setter for FieldSet<T, F> {
    fn set(&self, target: &mut dyn Any, value: Value<'static>) -> Result<(), AccessError> {
        let value = F::from_value(value)?;
        *(self.get_mut)(downcast_mut::<T>(target)?) = value;
        Ok(())
    }
}

pub(super) struct MethodGet<T, R> {
    pub call: fn(&T) -> R,
}

impl<T: Any, R: IntoValue + 'static> Getter for MethodGet<T, R> {
    fn get<'a>(&self, target: &'a dyn Any) -> Result<Value<'a>, AccessError> {
        Ok((self.call)(downcast::<T>(target)?).into_value())
    }
}

pub(super) struct StaticGet<R> {
    pub call: fn() -> R,
}

impl<R: IntoValue + 'static> Getter for StaticGet<R> {
    fn get<'a>(&self, _: &'a dyn Any) -> Result<Value<'a>, AccessError> {
        Ok((self.call)().into_value())
    }
}

pub(super) struct MethodSet<T, V> {
    pub call: fn(&mut T, V),
}

impl<T: Any, V: FromValue + 'static> Setter for MethodSet<T, V> {
    fn set(&self, target: &mut dyn Any, value: Value<'static>) -> Result<(), AccessError> {
        let value = V::from_value(value)?;
        (self.call)(downcast_mut::<T>(target)?, value);
        Ok(())
    }
}

pub(super) struct TryMethodSet<T, V> {
    pub call: fn(&mut T, V) -> Result<(), BoxedError>,
}

impl<T: Any, V: FromValue + 'static> Setter for TryMethodSet<T, V> {
    fn set(&self, target: &mut dyn Any, value: Value<'static>) -> Result<(), AccessError> {
        let value = V::from_value(value)?;
        (self.call)(downcast_mut::<T>(target)?, value).map_err(AccessError::Failed)
    }
}

pub(super) struct UpcastFn<T, B> {
    pub up: fn(&T) -> &B,
    pub up_mut: fn(&mut T) -> &mut B,
}

impl<T: Any, B: Any> Upcast for UpcastFn<T, B> {
    fn upcast<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any> {
        let target = target.downcast_ref::<T>()?;
        Some((self.up)(target) as &dyn Any)
    }

    fn upcast_mut<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let target = target.downcast_mut::<T>()?;
        Some((self.up_mut)(target) as &mut dyn Any)
    }
}

// -----------------------------------------------------------------------------
// Inherited accessors

/// Two projections applied one after the other.
pub(crate) struct ChainedUpcast {
    pub first: Arc<dyn Upcast>,
    pub then: Arc<dyn Upcast>,
}

impl Upcast for ChainedUpcast {
    fn upcast<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any> {
        self.then.upcast(self.first.upcast(target)?)
    }

    fn upcast_mut<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        self.then.upcast_mut(self.first.upcast_mut(target)?)
    }
}

/// A base class getter applied to a derived object.
pub(crate) struct ProjectedGetter {
    pub view: Arc<dyn Upcast>,
    pub inner: Arc<dyn Getter>,
}

impl Getter for ProjectedGetter {
    fn get<'a>(&self, target: &'a dyn Any) -> Result<Value<'a>, AccessError> {
        let base = self.view.upcast(target).ok_or(AccessError::TargetMismatch {
            expected: "base class view",
        })?;
        self.inner.get(base)
    }
}

/// A base class setter applied to a derived object.
pub(crate) struct ProjectedSetter {
    pub view: Arc<dyn Upcast>,
    pub inner: Arc<dyn Setter>,
}

impl Setter for ProjectedSetter {
    fn set(&self, target: &mut dyn Any, value: Value<'static>) -> Result<(), AccessError> {
        let base = self.view.upcast_mut(target).ok_or(AccessError::TargetMismatch {
            expected: "base class view",
        })?;
        self.inner.set(base, value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::{ChainedUpcast, FieldGet, FieldSet, Getter, ProjectedGetter, Setter, UpcastFn};
    use crate::error::AccessError;
    use crate::value::Value;

    #[derive(Default)]
    struct Base {
        id: u32,
    }

    #[derive(Default)]
    struct Middle {
        base: Base,
    }

    #[derive(Default)]
    struct Leaf {
        middle: Middle,
    }

    #[test]
    fn field_accessors_check_the_target() {
        let get = FieldGet::<Base, u32> { get: |b| &b.id };
        let set = FieldSet::<Base, u32> { get_mut: |b| &mut b.id };

        let mut base = Base::default();
        set.set(&mut base, Value::I64(7)).unwrap();
        assert_eq!(get.get(&base).unwrap(), Value::U32(7));

        let err = get.get(&Leaf::default()).unwrap_err();
        assert!(matches!(err, AccessError::TargetMismatch { .. }));
    }

    #[test]
    fn projections_chain() {
        let view = Arc::new(ChainedUpcast {
            first: Arc::new(UpcastFn::<Leaf, Middle> {
                up: |l| &l.middle,
                up_mut: |l| &mut l.middle,
            }),
            then: Arc::new(UpcastFn::<Middle, Base> {
                up: |m| &m.base,
                up_mut: |m| &mut m.base,
            }),
        });
        let getter = ProjectedGetter {
            view,
            inner: Arc::new(FieldGet::<Base, u32> { get: |b| &b.id }),
        };
        let mut leaf = Leaf::default();
        leaf.middle.base.id = 3;
        assert_eq!(getter.get(&leaf).unwrap(), Value::U32(3));
    }
}
