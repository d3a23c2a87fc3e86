mod config;
mod entity;
mod holder;
mod key;
pub mod keys;
mod minecart;
mod registry;
mod transaction;
mod value;
mod vector;
mod world;

pub use config::{CartDefaults, ConfigError};
pub use entity::{Entity, EntityType};
pub use holder::{DataHolder, DataHolderMut, EntityMut, EntityRef};
pub use key::Key;
pub use minecart::{Minecart, MinecartMut};
pub use registry::{KeyEntry, KeyRegistry, Provider, Validator};
pub use transaction::{DataTransactionResult, RejectReason};
pub use value::Value;
pub use vector::Vector3d;
pub use world::{Error, Result, World};
