use crate::Value;
use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

/// A typed identifier for one property slot on an entity.
///
/// Keys are plain constants; the value type is part of the key's
/// type, so binding a value of the wrong type does not compile:
///
/// ```compile_fail
/// use cartdata::{keys, EntityType, World};
///
/// let mut world = World::default();
/// let cart = world.spawn(EntityType::MINECART);
/// let _ = world.offer(cart, &keys::MINECART_SWIFTNESS, true);
/// ```
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: Value> Key<T> {
    pub(crate) fn id(&self) -> KeyId {
        KeyId {
            name: self.name,
            ty: TypeId::of::<T>(),
        }
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

/// Type-erased key identity. Two keys with the same name but
/// different value types are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct KeyId {
    name: &'static str,
    ty: TypeId,
}
