//! Typed accessors for minecarts.
//!
//! Each method is a thin wrapper over `require` or `offer` with one of
//! the builtin keys; new keys can be added to the registry without
//! touching these traits.

use crate::holder::{DataHolder, DataHolderMut};
use crate::transaction::DataTransactionResult;
use crate::{keys, Result, Vector3d};

pub trait Minecart: DataHolder {
    /// Whether the cart is currently on a valid rail block.
    fn is_on_rail(&self) -> Result<bool> {
        self.require(&keys::MINECART_IS_ON_RAIL)
    }

    /// The absolute maximum speed the cart may travel at.
    ///
    /// The default value is 0.4.
    fn swiftness(&self) -> Result<f64> {
        self.require(&keys::MINECART_SWIFTNESS)
    }

    /// The maximum speed the cart may travel at right now.
    ///
    /// Unlike `swiftness` this is affected by the cart's surroundings,
    /// but it never exceeds `swiftness`.
    fn potential_max_speed(&self) -> Result<f64> {
        self.require(&keys::MINECART_POTENTIAL_MAX_SPEED)
    }

    /// Whether the cart slows down faster without a passenger.
    fn slows_when_empty(&self) -> Result<bool> {
        self.require(&keys::MINECART_SLOW_WHEN_EMPTY)
    }

    /// Velocity modifier applied while the cart is airborne.
    fn airborne_velocity_mod(&self) -> Result<Vector3d> {
        self.require(&keys::MINECART_AIRBORNE_VELOCITY_MODIFIER)
    }

    /// Velocity modifier applied while the cart is off rails.
    fn derailed_velocity_mod(&self) -> Result<Vector3d> {
        self.require(&keys::MINECART_DERAILED_VELOCITY_MODIFIER)
    }
}

impl<H: DataHolder> Minecart for H {}

pub trait MinecartMut: DataHolderMut {
    /// Rejected for negative or non-finite speeds.
    fn set_swiftness(&mut self, swiftness: f64) -> DataTransactionResult<f64> {
        self.offer(&keys::MINECART_SWIFTNESS, swiftness)
    }

    fn set_slow_when_empty(&mut self, slow_when_empty: bool) -> DataTransactionResult<bool> {
        self.offer(&keys::MINECART_SLOW_WHEN_EMPTY, slow_when_empty)
    }

    fn set_airborne_velocity_mod(&mut self, modifier: Vector3d) -> DataTransactionResult<Vector3d> {
        self.offer(&keys::MINECART_AIRBORNE_VELOCITY_MODIFIER, modifier)
    }

    fn set_derailed_velocity_mod(&mut self, modifier: Vector3d) -> DataTransactionResult<Vector3d> {
        self.offer(&keys::MINECART_DERAILED_VELOCITY_MODIFIER, modifier)
    }
}

impl<H: DataHolderMut> MinecartMut for H {}
