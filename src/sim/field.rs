//! Coins scattered around the map
//!
//! Coins sit in an annulus around the origin whose outer edge moves out a
//! little every level.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::polar_to_ground;
use crate::tuning::Tuning;

/// A coin waiting to be picked up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub position: Vec3,
    /// Cosmetic rotation about the vertical axis
    pub spin: f32,
}

/// Active coins in spawn order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectibleField {
    coins: Vec<Collectible>,
    next_id: u32,
}

impl Default for CollectibleField {
    fn default() -> Self {
        Self {
            coins: Vec::new(),
            next_id: 1,
        }
    }
}

impl CollectibleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every coin with a fresh batch for `level`.
    /// Returns the ids of the coins that were removed.
    pub fn scatter<R: Rng>(&mut self, level: u32, tuning: &Tuning, rng: &mut R) -> Vec<u32> {
        let removed = self.clear();

        let min = tuning.coin_base_distance;
        let max = tuning.max_coin_distance(level);
        for _ in 0..tuning.coin_count {
            // random_range panics on an empty range
            let distance = if max > min { rng.random_range(min..=max) } else { min };
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let position = polar_to_ground(distance, angle, tuning.coin_height);
            self.spawn(position);
        }

        log::debug!(
            "Scattered {} coins for level {} ({:.0}..{:.0})",
            self.coins.len(),
            level,
            min,
            max
        );
        removed
    }

    /// Add a single coin (used by scatter and tests)
    pub fn spawn(&mut self, position: Vec3) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.coins.push(Collectible {
            id,
            position,
            spin: 0.0,
        });
        id
    }

    /// Remove every coin, returning their ids
    pub fn clear(&mut self) -> Vec<u32> {
        self.coins.drain(..).map(|c| c.id).collect()
    }

    /// Advance the cosmetic spin by one frame
    pub fn spin(&mut self, tuning: &Tuning) {
        for coin in &mut self.coins {
            coin.spin = (coin.spin + tuning.coin_spin_per_frame) % std::f32::consts::TAU;
        }
    }

    /// Remove and return, in spawn order, every coin matching `pred`
    pub fn take_where(&mut self, mut pred: impl FnMut(&Collectible) -> bool) -> Vec<Collectible> {
        let mut taken = Vec::new();
        self.coins.retain(|c| {
            if pred(c) {
                taken.push(*c);
                false
            } else {
                true
            }
        });
        taken
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collectible> {
        self.coins.iter()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground_radius;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_scatter_replaces_previous_batch() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut field = CollectibleField::new();

        let removed = field.scatter(1, &tuning, &mut rng);
        assert!(removed.is_empty());
        assert_eq!(field.len(), 20);
        let first_ids: Vec<u32> = field.iter().map(|c| c.id).collect();

        let removed = field.scatter(2, &tuning, &mut rng);
        assert_eq!(removed, first_ids);
        assert_eq!(field.len(), 20);
        assert!(field.iter().all(|c| !first_ids.contains(&c.id)));
    }

    #[test]
    fn test_scatter_height() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = CollectibleField::new();
        field.scatter(3, &tuning, &mut rng);
        assert!(field.iter().all(|c| c.position.y == 1.0));
    }

    #[test]
    fn test_zero_width_annulus() {
        let tuning = Tuning {
            coin_level_multiplier: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = CollectibleField::new();
        field.scatter(5, &tuning, &mut rng);
        assert!(field.iter().all(|c| (ground_radius(c.position) - 150.0).abs() < 1e-2));
    }

    #[test]
    fn test_spin_and_take() {
        let tuning = Tuning::default();
        let mut field = CollectibleField::new();
        let a = field.spawn(Vec3::ZERO);
        let b = field.spawn(Vec3::X);
        field.spin(&tuning);
        field.spin(&tuning);
        assert!(field.iter().all(|c| (c.spin - 0.1).abs() < 1e-6));

        let taken = field.take_where(|c| c.id == a);
        assert_eq!(taken.iter().map(|c| c.id).collect::<Vec<_>>(), vec![a]);
        assert!(field.take_where(|c| c.id == a).is_empty());
        assert_eq!(field.iter().map(|c| c.id).collect::<Vec<_>>(), vec![b]);
    }

    proptest! {
        #[test]
        fn prop_scatter_count_and_bounds(level in 1u32..=10, seed: u64) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut field = CollectibleField::new();
            field.scatter(level, &tuning, &mut rng);

            prop_assert_eq!(field.len(), tuning.coin_count as usize);
            let max = tuning.max_coin_distance(level);
            for coin in field.iter() {
                let r = ground_radius(coin.position);
                prop_assert!(r >= tuning.coin_base_distance - 1e-3, "r = {}", r);
                prop_assert!(r <= max + 1e-3, "r = {} max = {}", r, max);
            }
        }
    }
}
