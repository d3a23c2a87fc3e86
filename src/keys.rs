//! Builtin keys.

use crate::config::CartDefaults;
use crate::registry::{KeyEntry, KeyRegistry};
use crate::{Entity, EntityType, Key, Vector3d, World};

/// Whether the minecart is on a valid rail block. Maintained by the host.
pub const MINECART_IS_ON_RAIL: Key<bool> = Key::new("minecart_is_on_rail");
/// Absolute maximum speed the minecart may travel at.
pub const MINECART_SWIFTNESS: Key<f64> = Key::new("minecart_swiftness");
/// Maximum speed at this instant: swiftness, reduced by the
/// environment. Never exceeds swiftness.
pub const MINECART_POTENTIAL_MAX_SPEED: Key<f64> = Key::new("minecart_potential_max_speed");
/// Whether the minecart slows down faster without a passenger.
pub const MINECART_SLOW_WHEN_EMPTY: Key<bool> = Key::new("minecart_slow_when_empty");
pub const MINECART_AIRBORNE_VELOCITY_MODIFIER: Key<Vector3d> =
    Key::new("minecart_airborne_velocity_modifier");
pub const MINECART_DERAILED_VELOCITY_MODIFIER: Key<Vector3d> =
    Key::new("minecart_derailed_velocity_modifier");
/// Whether the entity is submerged. Maintained by the host.
pub const IS_IN_WATER: Key<bool> = Key::new("is_in_water");

/// Fraction of swiftness a minecart may reach while in water.
pub const WATER_SPEED_FACTOR: f64 = 0.5;

/// Registers every builtin key for `EntityType::MINECART`.
pub fn register_minecart_keys(registry: &mut KeyRegistry, defaults: &CartDefaults) {
    let cart = EntityType::MINECART;

    registry.register(
        &MINECART_IS_ON_RAIL,
        KeyEntry::stored().default(false).read_only().applies_to(cart),
    );
    registry.register(
        &IS_IN_WATER,
        KeyEntry::stored().default(false).read_only().applies_to(cart),
    );
    registry.register(
        &MINECART_SWIFTNESS,
        KeyEntry::stored()
            .default(defaults.swiftness)
            .validator(valid_speed)
            .applies_to(cart),
    );
    registry.register(
        &MINECART_POTENTIAL_MAX_SPEED,
        KeyEntry::derived(potential_max_speed).applies_to(cart),
    );
    registry.register(
        &MINECART_SLOW_WHEN_EMPTY,
        KeyEntry::stored()
            .default(defaults.slow_when_empty)
            .applies_to(cart),
    );
    registry.register(
        &MINECART_AIRBORNE_VELOCITY_MODIFIER,
        KeyEntry::stored()
            .default(defaults.airborne_velocity_modifier)
            .validator(valid_modifier)
            .applies_to(cart),
    );
    registry.register(
        &MINECART_DERAILED_VELOCITY_MODIFIER,
        KeyEntry::stored()
            .default(defaults.derailed_velocity_modifier)
            .validator(valid_modifier)
            .applies_to(cart),
    );
}

pub(crate) fn valid_speed(speed: &f64) -> bool {
    speed.is_finite() && *speed >= 0.0
}

pub(crate) fn valid_modifier(modifier: &Vector3d) -> bool {
    modifier.is_finite()
}

fn potential_max_speed(world: &World, entity: Entity) -> Option<f64> {
    let swiftness = world.get(entity, &MINECART_SWIFTNESS)?;
    let in_water = world.get(entity, &IS_IN_WATER).unwrap_or(false);
    Some(if in_water {
        swiftness * WATER_SPEED_FACTOR
    } else {
        swiftness
    })
}
