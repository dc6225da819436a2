//! Movement configuration.
//!
//! Every gameplay toggle the action code consults lives here. The default
//! reproduces the classic behaviour, quirks included; named presets switch
//! on the usual quality-of-life fixes.

use serde::{Deserialize, Serialize};

/// Tunables and behaviour toggles for the action state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    // ========================================================================
    // Fall damage
    // ========================================================================
    /// Hard landings hurt and can knock the avatar over.
    pub fall_damage: bool,

    /// Fall height above which a landing stings and squishes the avatar.
    pub fall_damage_height_small: f32,

    /// Fall height above which a landing knocks the avatar down.
    pub fall_damage_height_large: f32,

    // ========================================================================
    // Ground movement
    // ========================================================================
    /// Forward speed above which the render matrix aligns to the floor normal
    /// instead of sampling the terrain around the avatar. `None` always
    /// samples.
    pub fast_floor_align: Option<f32>,

    /// Turn rate while walking scales with speed instead of a flat `0x800`.
    pub velocity_based_turn_speed: bool,

    /// Side flips can start from a standstill turn-around.
    pub side_flip_at_low_speeds: bool,

    /// Finishing a turn-around faces the stick instead of the old heading.
    pub reset_direction_when_turning_around: bool,

    /// Z + A while walking goes straight into a long jump crouch slide.
    pub easier_long_jumps: bool,

    /// Backwards long jump speed build-up is clamped on landing.
    pub disable_blj: bool,

    /// A jump pressed up to five frames early on a slope is buffered.
    pub slope_buffer: bool,

    // ========================================================================
    // Airborne
    // ========================================================================
    /// Z during a twirl spins faster.
    pub z_twirl: bool,

    /// Ground pounding into a wall bonks off it.
    pub ground_pound_wall_bonk: bool,

    /// Frames after rolling off a ledge on a shell during which A still
    /// jumps. `0` disables.
    pub koopa_shell_coyote_time: u8,

    /// Landing in deep snow or sand after a long fall buries the avatar.
    pub getting_buried: bool,

    /// Strong wind can blow the cap off.
    pub cap_loss: bool,

    /// The metal cap ignores horizontal wind.
    pub wind_resistant_metal_cap: bool,

    /// Bonking off a wall mid-air releases whatever the avatar carries.
    /// Off keeps the classic hands-free holding glitch.
    pub drop_held_on_air_bonk: bool,

    // ========================================================================
    // Health
    // ========================================================================
    /// Health units restored or removed per frame by heal/hurt counters.
    pub health_step: i16,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            // Fall damage
            fall_damage: true,
            fall_damage_height_small: 1150.0,
            fall_damage_height_large: 3000.0,

            // Ground movement
            fast_floor_align: None,
            velocity_based_turn_speed: false,
            side_flip_at_low_speeds: false,
            reset_direction_when_turning_around: false,
            easier_long_jumps: false,
            disable_blj: false,
            slope_buffer: false,

            // Airborne
            z_twirl: false,
            ground_pound_wall_bonk: true,
            koopa_shell_coyote_time: 0,
            getting_buried: true,
            cap_loss: true,
            wind_resistant_metal_cap: false,
            drop_held_on_air_bonk: false,

            // Health
            health_step: 0x40,
        }
    }
}

impl MovementConfig {
    /// Common fixes and conveniences turned on.
    pub fn quality_of_life() -> Self {
        Self {
            fast_floor_align: Some(10.0),
            velocity_based_turn_speed: true,
            side_flip_at_low_speeds: true,
            reset_direction_when_turning_around: true,
            easier_long_jumps: true,
            disable_blj: true,
            slope_buffer: true,
            z_twirl: true,
            ground_pound_wall_bonk: false,
            koopa_shell_coyote_time: 5,
            wind_resistant_metal_cap: true,
            drop_held_on_air_bonk: true,
            ..Default::default()
        }
    }

    /// No fall damage and no burying, for test levels.
    pub fn forgiving() -> Self {
        Self {
            fall_damage: false,
            getting_buried: false,
            cap_loss: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MovementConfig::default();
        assert!(config.fall_damage);
        assert!(config.fall_damage_height_small < config.fall_damage_height_large);
        assert_eq!(config.koopa_shell_coyote_time, 0);
        assert_eq!(config.health_step, 0x40);
    }

    #[test]
    fn test_presets_keep_fall_heights() {
        let qol = MovementConfig::quality_of_life();
        assert!(qol.disable_blj);
        assert!(qol.drop_held_on_air_bonk);
        assert!(!MovementConfig::default().drop_held_on_air_bonk);
        assert!(qol.fast_floor_align.is_some());
        assert_eq!(qol.fall_damage_height_large, 3000.0);

        let forgiving = MovementConfig::forgiving();
        assert!(!forgiving.fall_damage);
        assert!(!forgiving.velocity_based_turn_speed);
    }
}
