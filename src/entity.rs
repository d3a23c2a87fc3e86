use std::fmt;

/// Handle to an entity owned by a `World`.
///
/// The version is bumped every time an index is reused, so a
/// handle to a despawned entity never resolves to its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) version: u32,
}

impl Entity {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn version(self) -> u32 {
        self.version
    }
}

/// The kind of an entity. Keys declare which kinds they apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityType(&'static str);

impl EntityType {
    pub const MINECART: EntityType = EntityType::new("minecart");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
