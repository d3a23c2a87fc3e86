use crate::key::KeyId;
use crate::{Entity, EntityType, Key, Value, World};
use ahash::AHashMap;
use std::any::Any;

/// Computes a value from other state in the world instead of storing it.
pub type Provider<T> = fn(&World, Entity) -> Option<T>;
/// Returns `false` for values the store must refuse.
pub type Validator<T> = fn(&T) -> bool;

pub(crate) enum Source<T> {
    Stored {
        default: Option<T>,
        validator: Option<Validator<T>>,
        read_only: bool,
    },
    Derived(Provider<T>),
}

/// Describes how the store treats one key.
pub struct KeyEntry<T> {
    pub(crate) source: Source<T>,
    applies_to: Vec<EntityType>,
}

impl<T: Value> KeyEntry<T> {
    /// A key whose values are written by `offer` and kept per entity.
    pub fn stored() -> Self {
        Self {
            source: Source::Stored {
                default: None,
                validator: None,
                read_only: false,
            },
            applies_to: vec![],
        }
    }

    /// A read-only key computed on every lookup.
    pub fn derived(provider: Provider<T>) -> Self {
        Self {
            source: Source::Derived(provider),
            applies_to: vec![],
        }
    }

    /// Value reported for entities that never had one set.
    /// Ignored for derived keys.
    pub fn default(mut self, value: T) -> Self {
        if let Source::Stored { default, .. } = &mut self.source {
            *default = Some(value);
        }
        self
    }

    pub fn validator(mut self, f: Validator<T>) -> Self {
        if let Source::Stored { validator, .. } = &mut self.source {
            *validator = Some(f);
        }
        self
    }

    /// Refuse `offer` and `remove`; only the host may `sync` the value.
    pub fn read_only(mut self) -> Self {
        if let Source::Stored { read_only, .. } = &mut self.source {
            *read_only = true;
        }
        self
    }

    pub fn applies_to(mut self, ty: EntityType) -> Self {
        if !self.applies_to.contains(&ty) {
            self.applies_to.push(ty);
        }
        self
    }

    pub(crate) fn applies(&self, ty: EntityType) -> bool {
        self.applies_to.contains(&ty)
    }

    pub(crate) fn is_stored(&self) -> bool {
        matches!(self.source, Source::Stored { .. })
    }

    pub(crate) fn is_writable(&self) -> bool {
        matches!(self.source, Source::Stored { read_only: false, .. })
    }

    pub(crate) fn accepts(&self, value: &T) -> bool {
        match &self.source {
            Source::Stored {
                validator: Some(f), ..
            } => f(value),
            _ => true,
        }
    }
}

/// The set of keys a `World` knows about.
pub struct KeyRegistry {
    entries: AHashMap<KeyId, Box<dyn Any + Send + Sync>>,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    /// Registers `key`, replacing any previous entry for it.
    pub fn register<T: Value>(&mut self, key: &Key<T>, entry: KeyEntry<T>) {
        if self.entries.insert(key.id(), Box::new(entry)).is_some() {
            log::warn!("key `{}` registered twice; keeping the latest entry", key.name());
        }
    }

    pub fn contains<T: Value>(&self, key: &Key<T>) -> bool {
        self.entries.contains_key(&key.id())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entry<T: Value>(&self, key: &Key<T>) -> Option<&KeyEntry<T>> {
        self.entries
            .get(&key.id())
            .and_then(|entry| entry.downcast_ref::<KeyEntry<T>>())
    }
}
