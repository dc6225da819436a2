//! 16-bit gameplay random number generator.
//!
//! A tiny xorshift-style generator with a 16-bit state. It has two fixed
//! points of its own (22026 and 43605) which are both redirected so the
//! sequence never gets stuck.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeededRandom {
    seed: u16,
}

impl SeededRandom {
    pub fn new(seed: u16) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u16 {
        self.seed
    }

    /// Advance the state and return it.
    pub fn next_u16(&mut self) -> u16 {
        if self.seed == 22026 {
            self.seed = 0;
        }

        let s = self.seed;
        let mut t1 = ((s & 0x00FF) << 8) ^ s;
        let s = ((t1 & 0x00FF) << 8).wrapping_add((t1 & 0xFF00) >> 8);
        t1 = ((t1 & 0x00FF) << 1) ^ s;
        let t2 = (t1 >> 1) ^ 0xFF80;

        self.seed = if t1 & 1 == 0 {
            if t2 == 43605 {
                0
            } else {
                t2 ^ 0x1FF4
            }
        } else {
            t2 ^ 0x8180
        };

        self.seed
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_float(&mut self) -> f32 {
        f32::from(self.next_u16()) / 65536.0
    }

    /// `1` or `-1` with roughly even odds.
    pub fn next_sign(&mut self) -> i32 {
        if self.next_u16() >= 0x7FFF {
            1
        } else {
            -1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_from_zero() {
        let mut rng = SeededRandom::new(0);
        assert_eq!(rng.next_u16(), 0xE074);
        assert_eq!(rng.seed(), 0xE074);
    }

    #[test]
    fn test_fixed_point_is_redirected() {
        let mut stuck = SeededRandom::new(22026);
        let mut zero = SeededRandom::new(0);
        assert_eq!(stuck.next_u16(), zero.next_u16());
    }

    #[test]
    fn test_float_range() {
        let mut rng = SeededRandom::new(1234);
        for _ in 0..1000 {
            let f = rng.next_float();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_sequence_does_not_stall() {
        let mut rng = SeededRandom::new(0);
        let mut prev = rng.next_u16();
        for _ in 0..500 {
            let next = rng.next_u16();
            assert_ne!(next, prev);
            prev = next;
        }
    }
}
