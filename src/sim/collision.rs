//! Character-to-coin pickup detection

use glam::Vec3;

use super::field::{Collectible, CollectibleField};
use crate::tuning::Tuning;

/// True if `coin` is strictly inside the pickup radius around `character`
#[inline]
pub fn within_pickup_range(character: Vec3, coin: Vec3, pickup_radius: f32) -> bool {
    character.distance(coin) < pickup_radius
}

/// Remove and return every coin the character is touching, in spawn order.
///
/// Uses a single stable pass so removing coins mid-scan never skips or
/// repeats an entry.
pub fn collect_pickups(
    character: Vec3,
    field: &mut CollectibleField,
    tuning: &Tuning,
) -> Vec<Collectible> {
    field.take_where(|coin| within_pickup_range(character, coin.position, tuning.pickup_radius))
}
