use crate::transaction::DataTransactionResult;
use crate::{Entity, Key, Result, Value, World};

/// Read access to the values attached to one entity.
pub trait DataHolder {
    fn get<T: Value>(&self, key: &Key<T>) -> Option<T>;

    /// Like `get`, but absence is an error.
    fn require<T: Value>(&self, key: &Key<T>) -> Result<T>;

    fn supports<T: Value>(&self, key: &Key<T>) -> bool;
}

/// Write access to the values attached to one entity.
pub trait DataHolderMut: DataHolder {
    fn offer<T: Value>(&mut self, key: &Key<T>, value: T) -> DataTransactionResult<T>;

    fn remove<T: Value>(&mut self, key: &Key<T>) -> DataTransactionResult<T>;
}

/// A shared view of one entity in a `World`.
#[derive(Clone, Copy)]
pub struct EntityRef<'w> {
    world: &'w World,
    entity: Entity,
}

impl<'w> EntityRef<'w> {
    pub(crate) fn new(world: &'w World, entity: Entity) -> Self {
        Self { world, entity }
    }

    pub fn id(&self) -> Entity {
        self.entity
    }
}

impl DataHolder for EntityRef<'_> {
    fn get<T: Value>(&self, key: &Key<T>) -> Option<T> {
        self.world.get(self.entity, key)
    }

    fn require<T: Value>(&self, key: &Key<T>) -> Result<T> {
        self.world.require(self.entity, key)
    }

    fn supports<T: Value>(&self, key: &Key<T>) -> bool {
        self.world.supports(self.entity, key)
    }
}

/// An exclusive view of one entity in a `World`.
pub struct EntityMut<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> EntityMut<'w> {
    pub(crate) fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    pub fn id(&self) -> Entity {
        self.entity
    }
}

impl DataHolder for EntityMut<'_> {
    fn get<T: Value>(&self, key: &Key<T>) -> Option<T> {
        self.world.get(self.entity, key)
    }

    fn require<T: Value>(&self, key: &Key<T>) -> Result<T> {
        self.world.require(self.entity, key)
    }

    fn supports<T: Value>(&self, key: &Key<T>) -> bool {
        self.world.supports(self.entity, key)
    }
}

impl DataHolderMut for EntityMut<'_> {
    fn offer<T: Value>(&mut self, key: &Key<T>, value: T) -> DataTransactionResult<T> {
        self.world.offer(self.entity, key, value)
    }

    fn remove<T: Value>(&mut self, key: &Key<T>) -> DataTransactionResult<T> {
        self.world.remove(self.entity, key)
    }
}
