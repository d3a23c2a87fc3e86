use crate::config::CartDefaults;
use crate::holder::{EntityMut, EntityRef};
use crate::key::KeyId;
use crate::registry::{KeyEntry, Source};
use crate::transaction::{DataTransactionResult, RejectReason};
use crate::{keys, Entity, EntityType, Key, KeyRegistry, Value};
use ahash::AHashMap;
use bitvec::order::Local;
use bitvec::vec::BitVec;
use std::any::Any;
use std::{iter, mem};
use thiserror::Error;

type StdResult<T, E> = std::result::Result<T, E>;
pub type Result<T> = StdResult<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("entity no longer exists")]
    VersionMismatch,
    #[error("entity has no value for required key `{key}`")]
    MissingRequiredValue { key: &'static str },
    #[error("value for key `{key}` rejected: {reason}")]
    RejectedValue {
        key: &'static str,
        reason: RejectReason,
    },
}

/// Owns entities and the values attached to them.
pub struct World {
    /// Vector of current entity versions, indexed
    /// by the entity's index.
    versions: Vec<u32>,
    /// Bit vector with bits set to 1 for entities that are alive.
    alive: BitVec<Local, usize>,
    /// Type of each live entity, indexed by the entity's index.
    types: Vec<Option<EntityType>>,
    /// Set of free entity indices.
    free: Vec<u32>,
    /// Explicitly stored values, one storage per key.
    storages: AHashMap<KeyId, Box<dyn ErasedStorage>>,
    registry: KeyRegistry,
    /// Next entity index to add.
    entity_counter: u32,
    /// Number of entities in the world.
    num_entities: usize,
}

impl Default for World {
    fn default() -> Self {
        Self::with_defaults(&CartDefaults::default())
    }
}

impl World {
    pub fn new(registry: KeyRegistry) -> Self {
        Self {
            versions: vec![],
            alive: BitVec::new(),
            types: vec![],
            free: vec![],
            storages: AHashMap::new(),
            registry,
            entity_counter: 0,
            num_entities: 0,
        }
    }

    /// Creates a world with the builtin minecart keys registered.
    pub fn with_defaults(defaults: &CartDefaults) -> Self {
        let mut registry = KeyRegistry::new();
        keys::register_minecart_keys(&mut registry, defaults);
        Self::new(registry)
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn spawn(&mut self, ty: EntityType) -> Entity {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                if self.entity_counter >= self.versions.len() as u32 {
                    self.alloc_more_entities();
                }
                let i = self.entity_counter;
                self.entity_counter += 1;
                i
            }
        };

        let slot = index as usize;
        self.versions[slot] = self.versions[slot].wrapping_add(1);
        self.alive.set(slot, true);
        self.types[slot] = Some(ty);
        self.num_entities += 1;

        Entity {
            index,
            version: self.versions[slot],
        }
    }

    /// Removes an entity along with every value stored for it.
    pub fn despawn(&mut self, entity: Entity) -> Result<()> {
        self.check_valid_entity(entity)?;

        let slot = entity.index as usize;
        self.alive.set(slot, false);
        self.types[slot] = None;
        for storage in self.storages.values_mut() {
            storage.remove_index(slot);
        }
        self.free.push(entity.index);
        self.num_entities -= 1;

        log::debug!("despawned entity {}v{}", entity.index, entity.version);
        Ok(())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.check_valid_entity(entity).is_ok()
    }

    pub fn entity_type(&self, entity: Entity) -> Result<EntityType> {
        self.check_valid_entity(entity)?;
        self.types[entity.index as usize].ok_or(Error::VersionMismatch)
    }

    pub fn size(&self) -> usize {
        self.num_entities
    }

    /// Despawns every entity. Handles obtained before the call stay invalid.
    pub fn clear(&mut self) {
        for slot in 0..self.entity_counter as usize {
            self.alive.set(slot, false);
            self.types[slot] = None;
        }
        self.free = (0..self.entity_counter).rev().collect();
        self.storages.clear();
        self.num_entities = 0;
    }

    pub fn entity(&self, entity: Entity) -> EntityRef<'_> {
        EntityRef::new(self, entity)
    }

    pub fn entity_mut(&mut self, entity: Entity) -> EntityMut<'_> {
        EntityMut::new(self, entity)
    }

    /// Whether `key` applies to this entity.
    pub fn supports<T: Value>(&self, entity: Entity, key: &Key<T>) -> bool {
        self.entry_for(entity, key).is_some()
    }

    /// Looks up the value of `key`: the stored value, else the key's
    /// default. Derived keys are computed on each call.
    pub fn get<T: Value>(&self, entity: Entity, key: &Key<T>) -> Option<T> {
        let entry = self.entry_for(entity, key)?;
        match &entry.source {
            Source::Derived(provider) => provider(self, entity),
            Source::Stored { default, .. } => self
                .storage(key)
                .and_then(|storage| storage.get(entity.index as usize))
                .cloned()
                .or_else(|| default.clone()),
        }
    }

    pub fn require<T: Value>(&self, entity: Entity, key: &Key<T>) -> Result<T> {
        self.check_valid_entity(entity)?;
        self.get(entity, key)
            .ok_or(Error::MissingRequiredValue { key: key.name() })
    }

    /// Asks the store to set `key` to `value`.
    ///
    /// Read-only, inapplicable and invalid values are refused and
    /// the stored value is left as it was.
    pub fn offer<T: Value>(
        &mut self,
        entity: Entity,
        key: &Key<T>,
        value: T,
    ) -> DataTransactionResult<T> {
        let writable = match self.entry_for(entity, key) {
            Some(entry) => entry.is_writable(),
            None => return reject(key, Some(value), RejectReason::Unsupported),
        };
        if !writable {
            return reject(key, Some(value), RejectReason::ReadOnly);
        }
        self.write(entity, key, value)
    }

    /// Writes a value on behalf of the host simulation. Unlike `offer`
    /// this may change read-only keys; validation still applies.
    pub fn sync<T: Value>(
        &mut self,
        entity: Entity,
        key: &Key<T>,
        value: T,
    ) -> DataTransactionResult<T> {
        let stored = match self.entry_for(entity, key) {
            Some(entry) => entry.is_stored(),
            None => return reject(key, Some(value), RejectReason::Unsupported),
        };
        if !stored {
            return reject(key, Some(value), RejectReason::ReadOnly);
        }
        self.write(entity, key, value)
    }

    /// Drops the stored value of `key` so its default applies again.
    pub fn remove<T: Value>(&mut self, entity: Entity, key: &Key<T>) -> DataTransactionResult<T> {
        let writable = match self.entry_for(entity, key) {
            Some(entry) => entry.is_writable(),
            None => return reject(key, None, RejectReason::Unsupported),
        };
        if !writable {
            return reject(key, None, RejectReason::ReadOnly);
        }

        let replaced = self
            .storage_mut(key)
            .and_then(|storage| storage.remove(entity.index as usize));
        log::trace!("removed `{}` from entity {}", key.name(), entity.index);
        DataTransactionResult::Success { replaced }
    }

    fn write<T: Value>(
        &mut self,
        entity: Entity,
        key: &Key<T>,
        value: T,
    ) -> DataTransactionResult<T> {
        let accepted = self
            .entry_for(entity, key)
            .map_or(false, |entry| entry.accepts(&value));
        if !accepted {
            return reject(key, Some(value), RejectReason::Invalid);
        }

        let replaced = self.get(entity, key);
        log::trace!(
            "entity {}: `{}` = {:?}",
            entity.index,
            key.name(),
            value
        );
        match self.storage_mut(key) {
            Some(storage) => {
                storage.insert(entity.index as usize, value);
                DataTransactionResult::Success { replaced }
            }
            None => reject(key, Some(value), RejectReason::Unsupported),
        }
    }

    fn entry_for<T: Value>(&self, entity: Entity, key: &Key<T>) -> Option<&KeyEntry<T>> {
        let ty = self.entity_type(entity).ok()?;
        self.registry.entry(key).filter(|entry| entry.applies(ty))
    }

    fn alloc_more_entities(&mut self) {
        const TO_ADD: usize = 64;
        self.alive.extend(iter::repeat(false).take(TO_ADD));
        self.versions.extend(iter::repeat(0).take(TO_ADD));
        self.types.extend(iter::repeat(None).take(TO_ADD));
    }

    fn check_valid_entity(&self, entity: Entity) -> Result<()> {
        let slot = entity.index as usize;
        if slot < self.versions.len()
            && self.alive[slot]
            && self.versions[slot] == entity.version
        {
            Ok(())
        } else {
            Err(Error::VersionMismatch)
        }
    }

    fn storage<T: Value>(&self, key: &Key<T>) -> Option<&ValueStorage<T>> {
        self.storages
            .get(&key.id())
            .and_then(|storage| storage.as_any().downcast_ref())
    }

    fn storage_mut<T: Value>(&mut self, key: &Key<T>) -> Option<&mut ValueStorage<T>> {
        self.storages
            .entry(key.id())
            .or_insert_with(|| Box::new(ValueStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut()
    }
}

fn reject<T: Value>(
    key: &Key<T>,
    rejected: Option<T>,
    reason: RejectReason,
) -> DataTransactionResult<T> {
    log::debug!("rejected write to `{}`: {}", key.name(), reason);
    DataTransactionResult::Rejected {
        key: key.name(),
        rejected,
        reason,
    }
}

/// Lets `despawn` drop values without knowing their types.
trait ErasedStorage: Send + Sync {
    fn remove_index(&mut self, index: usize);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Value> ErasedStorage for ValueStorage<T> {
    fn remove_index(&mut self, index: usize) {
        self.remove(index);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

const EMPTY: u32 = u32::MAX;

/// Stores the values of one key.
///
/// This storage is based on sparse sets.
struct ValueStorage<T> {
    /// Stores indices into `dense`, indexed by the entity's
    /// index. `EMPTY` marks entities without a value.
    sparse: Vec<u32>,
    /// Stores the entity index owning each entry of `data`.
    dense: Vec<u32>,
    data: Vec<T>,
}

impl<T> ValueStorage<T> {
    fn new() -> Self {
        Self {
            sparse: vec![],
            dense: vec![],
            data: vec![],
        }
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.dense_index(index).map(|dense_index| &self.data[dense_index])
    }

    fn insert(&mut self, index: usize, value: T) -> Option<T> {
        if let Some(dense_index) = self.dense_index(index) {
            return Some(mem::replace(&mut self.data[dense_index], value));
        }

        self.extend_if_necessary(index);
        self.sparse[index] = self.dense.len() as u32;
        self.dense.push(index as u32);
        self.data.push(value);
        None
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        let dense_index = self.dense_index(index)?;

        // Swap-remove, then repoint the entry that moved into the hole
        self.sparse[index] = EMPTY;
        self.dense.swap_remove(dense_index);
        let value = self.data.swap_remove(dense_index);
        if let Some(&moved) = self.dense.get(dense_index) {
            self.sparse[moved as usize] = dense_index as u32;
        }

        Some(value)
    }

    fn dense_index(&self, index: usize) -> Option<usize> {
        match self.sparse.get(index) {
            Some(&dense_index) if dense_index != EMPTY => Some(dense_index as usize),
            _ => None,
        }
    }

    fn extend_if_necessary(&mut self, index: usize) {
        if index >= self.sparse.len() {
            let to_add = index - self.sparse.len() + 1;
            self.sparse.extend(iter::repeat(EMPTY).take(to_add));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3d;

    const PIG: EntityType = EntityType::new("pig");

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn world_is_send_sync() {
        assert_send_sync::<World>();
    }

    #[test]
    fn storage_swap_remove_keeps_others() {
        let mut storage = ValueStorage::new();
        assert_eq!(storage.insert(0, 'a'), None);
        assert_eq!(storage.insert(5, 'b'), None);
        assert_eq!(storage.insert(2, 'c'), None);
        assert_eq!(storage.insert(5, 'B'), Some('b'));

        assert_eq!(storage.remove(0), Some('a'));
        assert_eq!(storage.remove(0), None);
        assert_eq!(storage.get(5), Some(&'B'));
        assert_eq!(storage.get(2), Some(&'c'));
        assert_eq!(storage.get(1), None);
        assert_eq!(storage.get(100), None);

        assert_eq!(storage.remove(2), Some('c'));
        assert_eq!(storage.get(5), Some(&'B'));
    }

    #[test]
    fn spawn_recycles_and_bumps_version() {
        let mut world = World::default();
        let a = world.spawn(EntityType::MINECART);
        let b = world.spawn(PIG);
        assert_eq!(world.size(), 2);
        assert_eq!(world.entity_type(b).unwrap(), PIG);

        world.despawn(a).unwrap();
        assert!(!world.is_alive(a));
        assert!(matches!(world.despawn(a), Err(Error::VersionMismatch)));

        let c = world.spawn(EntityType::MINECART);
        assert_eq!(c.index(), a.index());
        assert_ne!(c.version(), a.version());
        assert!(world.is_alive(c));
        assert!(!world.is_alive(a));
        assert_eq!(world.size(), 2);
    }

    #[test]
    fn despawn_drops_values() {
        let mut world = World::default();
        let cart = world.spawn(EntityType::MINECART);
        assert!(world.offer(cart, &keys::MINECART_SWIFTNESS, 1.5).is_success());

        world.despawn(cart).unwrap();
        let fresh = world.spawn(EntityType::MINECART);
        assert_eq!(fresh.index(), cart.index());
        assert_eq!(world.get(fresh, &keys::MINECART_SWIFTNESS), Some(0.4));
    }

    #[test]
    fn clear_invalidates_handles() {
        let mut world = World::default();
        let cart = world.spawn(EntityType::MINECART);
        let _ = world.offer(cart, &keys::MINECART_SLOW_WHEN_EMPTY, false);

        world.clear();
        assert_eq!(world.size(), 0);
        assert!(!world.is_alive(cart));
        assert!(matches!(
            world.require(cart, &keys::MINECART_SLOW_WHEN_EMPTY),
            Err(Error::VersionMismatch)
        ));

        let again = world.spawn(EntityType::MINECART);
        assert_eq!(world.get(again, &keys::MINECART_SLOW_WHEN_EMPTY), Some(true));
    }

    #[test]
    fn offer_then_get_round_trips() {
        let mut world = World::default();
        let cart = world.spawn(EntityType::MINECART);

        let result = world.offer(cart, &keys::MINECART_SWIFTNESS, 0.8);
        assert_eq!(result.replaced(), Some(&0.4));
        assert_eq!(world.get(cart, &keys::MINECART_SWIFTNESS), Some(0.8));

        let modifier = Vector3d::new(0.1, 0.2, 0.3);
        let _ = world.offer(cart, &keys::MINECART_DERAILED_VELOCITY_MODIFIER, modifier);
        assert_eq!(
            world.require(cart, &keys::MINECART_DERAILED_VELOCITY_MODIFIER).unwrap(),
            modifier
        );
    }

    #[test]
    fn invalid_offer_leaves_value_unchanged() {
        let mut world = World::default();
        let cart = world.spawn(EntityType::MINECART);
        let _ = world.offer(cart, &keys::MINECART_SWIFTNESS, 0.6);

        let result = world.offer(cart, &keys::MINECART_SWIFTNESS, -1.0);
        assert_eq!(
            result,
            DataTransactionResult::Rejected {
                key: "minecart_swiftness",
                rejected: Some(-1.0),
                reason: RejectReason::Invalid,
            }
        );
        assert_eq!(world.get(cart, &keys::MINECART_SWIFTNESS), Some(0.6));

        let nan = world.offer(cart, &keys::MINECART_SWIFTNESS, f64::NAN);
        assert_eq!(nan.reason(), Some(RejectReason::Invalid));
    }

    #[test]
    fn inapplicable_key_is_missing() {
        let mut world = World::default();
        let pig = world.spawn(PIG);

        assert!(!world.supports(pig, &keys::MINECART_SWIFTNESS));
        assert_eq!(world.get(pig, &keys::MINECART_SWIFTNESS), None);
        assert!(matches!(
            world.require(pig, &keys::MINECART_SWIFTNESS),
            Err(Error::MissingRequiredValue {
                key: "minecart_swiftness"
            })
        ));
        assert_eq!(
            world.offer(pig, &keys::MINECART_SWIFTNESS, 1.0).reason(),
            Some(RejectReason::Unsupported)
        );
    }

    #[test]
    fn stored_key_without_default_is_missing_until_set() {
        const FUEL: Key<u32> = Key::new("fuel");

        let mut registry = KeyRegistry::new();
        registry.register(&FUEL, KeyEntry::stored().applies_to(PIG));
        let mut world = World::new(registry);
        let pig = world.spawn(PIG);

        assert!(world.supports(pig, &FUEL));
        assert!(matches!(
            world.require(pig, &FUEL),
            Err(Error::MissingRequiredValue { key: "fuel" })
        ));

        assert_eq!(world.offer(pig, &FUEL, 7).replaced(), None);
        assert_eq!(world.require(pig, &FUEL).unwrap(), 7);

        assert_eq!(world.remove(pig, &FUEL).replaced(), Some(&7));
        assert_eq!(world.get(pig, &FUEL), None);
    }

    #[test]
    fn read_only_keys_only_change_through_sync() {
        let mut world = World::default();
        let cart = world.spawn(EntityType::MINECART);

        let result = world.offer(cart, &keys::MINECART_IS_ON_RAIL, true);
        assert_eq!(result.reason(), Some(RejectReason::ReadOnly));
        assert_eq!(world.get(cart, &keys::MINECART_IS_ON_RAIL), Some(false));
        assert_eq!(
            world.remove(cart, &keys::MINECART_IS_ON_RAIL).reason(),
            Some(RejectReason::ReadOnly)
        );

        assert!(world.sync(cart, &keys::MINECART_IS_ON_RAIL, true).is_success());
        assert_eq!(world.get(cart, &keys::MINECART_IS_ON_RAIL), Some(true));

        let derived = world.sync(cart, &keys::MINECART_POTENTIAL_MAX_SPEED, 9.0);
        assert_eq!(derived.reason(), Some(RejectReason::ReadOnly));
    }

    #[test]
    fn remove_restores_default() {
        let mut world = World::default();
        let cart = world.spawn(EntityType::MINECART);
        let _ = world.offer(cart, &keys::MINECART_SWIFTNESS, 2.0);

        let result = world.remove(cart, &keys::MINECART_SWIFTNESS);
        assert_eq!(result.replaced(), Some(&2.0));
        assert_eq!(world.get(cart, &keys::MINECART_SWIFTNESS), Some(0.4));

        let again = world.remove(cart, &keys::MINECART_SWIFTNESS);
        assert!(again.is_success());
        assert_eq!(again.replaced(), None);
    }

    #[test]
    fn stale_handle_fails_require() {
        let mut world = World::default();
        let cart = world.spawn(EntityType::MINECART);
        world.despawn(cart).unwrap();

        assert!(matches!(
            world.require(cart, &keys::MINECART_SWIFTNESS),
            Err(Error::VersionMismatch)
        ));
        assert_eq!(
            world.offer(cart, &keys::MINECART_SWIFTNESS, 1.0).reason(),
            Some(RejectReason::Unsupported)
        );
    }
}
