//! Action identifiers.
//!
//! An action id packs three things into a `u32`:
//!
//! - bits 0-8: the action number (unique per action)
//! - bits 6-8: the group (stationary, moving, airborne, ...), which picks the
//!   dispatch table category
//! - bits 9 and up: behaviour flags read by the stepper and the global
//!   cancels (`AIR`, `INVULNERABLE`, `CONTROL_JUMP_HEIGHT`, ...)

use serde::{Deserialize, Serialize};

/// Dispatch category of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionGroup {
    Stationary,
    Moving,
    Airborne,
    Submerged,
    Cutscene,
    Automatic,
    Object,
}

/// A packed action id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActionId(pub u32);

impl ActionId {
    pub const ID_MASK: u32 = 0x0000_01FF;
    pub const GROUP_MASK: u32 = 0x0000_01C0;

    pub const GROUP_STATIONARY: u32 = 0 << 6;
    pub const GROUP_MOVING: u32 = 1 << 6;
    pub const GROUP_AIRBORNE: u32 = 2 << 6;
    pub const GROUP_SUBMERGED: u32 = 3 << 6;
    pub const GROUP_CUTSCENE: u32 = 4 << 6;
    pub const GROUP_AUTOMATIC: u32 = 5 << 6;
    pub const GROUP_OBJECT: u32 = 6 << 6;

    // ========================================================================
    // Flags
    // ========================================================================
    pub const FLAG_STATIONARY: u32 = 1 << 9;
    pub const FLAG_MOVING: u32 = 1 << 10;
    pub const FLAG_AIR: u32 = 1 << 11;
    pub const FLAG_INTANGIBLE: u32 = 1 << 12;
    pub const FLAG_SWIMMING: u32 = 1 << 13;
    pub const FLAG_METAL_WATER: u32 = 1 << 14;
    pub const FLAG_SHORT_HITBOX: u32 = 1 << 15;
    pub const FLAG_RIDING_SHELL: u32 = 1 << 16;
    pub const FLAG_INVULNERABLE: u32 = 1 << 17;
    pub const FLAG_BUTT_OR_STOMACH_SLIDE: u32 = 1 << 18;
    pub const FLAG_DIVING: u32 = 1 << 19;
    pub const FLAG_ON_POLE: u32 = 1 << 20;
    pub const FLAG_HANGING: u32 = 1 << 21;
    pub const FLAG_IDLE: u32 = 1 << 22;
    pub const FLAG_ATTACKING: u32 = 1 << 23;
    pub const FLAG_ALLOW_VERTICAL_WIND_ACTION: u32 = 1 << 24;
    pub const FLAG_CONTROL_JUMP_HEIGHT: u32 = 1 << 25;
    pub const FLAG_ALLOW_FIRST_PERSON: u32 = 1 << 26;
    pub const FLAG_PAUSE_EXIT: u32 = 1 << 27;
    pub const FLAG_SWIMMING_OR_FLYING: u32 = 1 << 28;
    pub const FLAG_WATER_OR_TEXT: u32 = 1 << 29;
    pub const FLAG_THROWING: u32 = 1 << 31;

    pub const UNINITIALIZED: Self = Self(0x0000_0000);

    // ========================================================================
    // Stationary
    // ========================================================================
    pub const IDLE: Self = Self(0x0C40_0201);
    pub const START_SLEEPING: Self = Self(0x0C40_0202);
    pub const SLEEPING: Self = Self(0x0C00_0203);
    pub const WAKING_UP: Self = Self(0x0C00_0204);
    pub const PANTING: Self = Self(0x0C40_0205);
    pub const HOLD_IDLE: Self = Self(0x0800_0207);
    pub const HOLD_HEAVY_IDLE: Self = Self(0x0800_0208);
    pub const STANDING_AGAINST_WALL: Self = Self(0x0C40_0209);
    pub const COUGHING: Self = Self(0x0C40_020A);
    pub const SHIVERING: Self = Self(0x0C40_020B);
    pub const IN_QUICKSAND: Self = Self(0x0002_020D);
    pub const CROUCHING: Self = Self(0x0C00_8220);
    pub const START_CROUCHING: Self = Self(0x0C00_8221);
    pub const STOP_CROUCHING: Self = Self(0x0C00_8222);
    pub const START_CRAWLING: Self = Self(0x0C00_8223);
    pub const STOP_CRAWLING: Self = Self(0x0C00_8224);
    pub const SLIDE_KICK_SLIDE_STOP: Self = Self(0x0800_0225);
    pub const SHOCKWAVE_BOUNCE: Self = Self(0x0002_0226);
    pub const FIRST_PERSON: Self = Self(0x0C00_0227);
    pub const BACKFLIP_LAND_STOP: Self = Self(0x0800_022F);
    pub const JUMP_LAND_STOP: Self = Self(0x0C00_0230);
    pub const DOUBLE_JUMP_LAND_STOP: Self = Self(0x0C00_0231);
    pub const FREEFALL_LAND_STOP: Self = Self(0x0C00_0232);
    pub const SIDE_FLIP_LAND_STOP: Self = Self(0x0C00_0233);
    pub const HOLD_JUMP_LAND_STOP: Self = Self(0x0800_0234);
    pub const HOLD_FREEFALL_LAND_STOP: Self = Self(0x0800_0235);
    pub const AIR_THROW_LAND: Self = Self(0x8000_0A36);
    pub const TWIRL_LAND: Self = Self(0x1880_0238);
    pub const LAVA_BOOST_LAND: Self = Self(0x0800_0239);
    pub const TRIPLE_JUMP_LAND_STOP: Self = Self(0x0800_023A);
    pub const LONG_JUMP_LAND_STOP: Self = Self(0x0800_023B);
    pub const GROUND_POUND_LAND: Self = Self(0x0080_023C);
    pub const BRAKING_STOP: Self = Self(0x0C00_023D);
    pub const BUTT_SLIDE_STOP: Self = Self(0x0C00_023E);
    pub const HOLD_BUTT_SLIDE_STOP: Self = Self(0x0800_043F);

    // ========================================================================
    // Moving
    // ========================================================================
    pub const WALKING: Self = Self(0x0400_0440);
    pub const HOLD_WALKING: Self = Self(0x0000_0442);
    pub const TURNING_AROUND: Self = Self(0x0000_0443);
    pub const FINISH_TURNING_AROUND: Self = Self(0x0000_0444);
    pub const BRAKING: Self = Self(0x0400_0445);
    pub const RIDING_SHELL_GROUND: Self = Self(0x2081_0446);
    pub const HOLD_HEAVY_WALKING: Self = Self(0x0000_0447);
    pub const CRAWLING: Self = Self(0x0400_8448);
    pub const BURNING_GROUND: Self = Self(0x0002_0449);
    pub const DECELERATING: Self = Self(0x0400_044A);
    pub const HOLD_DECELERATING: Self = Self(0x0000_044B);
    pub const BEGIN_SLIDING: Self = Self(0x0000_0450);
    pub const HOLD_BEGIN_SLIDING: Self = Self(0x0000_0451);
    pub const BUTT_SLIDE: Self = Self(0x0084_0452);
    pub const STOMACH_SLIDE: Self = Self(0x008C_0453);
    pub const HOLD_BUTT_SLIDE: Self = Self(0x0084_0454);
    pub const HOLD_STOMACH_SLIDE: Self = Self(0x008C_0455);
    pub const DIVE_SLIDE: Self = Self(0x0088_0456);
    pub const MOVE_PUNCHING: Self = Self(0x0080_0457);
    pub const CROUCH_SLIDE: Self = Self(0x0480_8459);
    pub const SLIDE_KICK_SLIDE: Self = Self(0x0080_045A);
    pub const HARD_BACKWARD_GROUND_KB: Self = Self(0x0002_0460);
    pub const HARD_FORWARD_GROUND_KB: Self = Self(0x0002_0461);
    pub const BACKWARD_GROUND_KB: Self = Self(0x0002_0462);
    pub const FORWARD_GROUND_KB: Self = Self(0x0002_0463);
    pub const SOFT_BACKWARD_GROUND_KB: Self = Self(0x0002_0464);
    pub const SOFT_FORWARD_GROUND_KB: Self = Self(0x0002_0465);
    pub const GROUND_BONK: Self = Self(0x0002_0466);
    pub const DEATH_EXIT_LAND: Self = Self(0x0002_0467);
    pub const JUMP_LAND: Self = Self(0x0400_0470);
    pub const FREEFALL_LAND: Self = Self(0x0400_0471);
    pub const DOUBLE_JUMP_LAND: Self = Self(0x0400_0472);
    pub const SIDE_FLIP_LAND: Self = Self(0x0400_0473);
    pub const HOLD_JUMP_LAND: Self = Self(0x0000_0474);
    pub const HOLD_FREEFALL_LAND: Self = Self(0x0000_0475);
    pub const QUICKSAND_JUMP_LAND: Self = Self(0x0000_0476);
    pub const HOLD_QUICKSAND_JUMP_LAND: Self = Self(0x0000_0477);
    pub const TRIPLE_JUMP_LAND: Self = Self(0x0400_0478);
    pub const LONG_JUMP_LAND: Self = Self(0x0000_0479);
    pub const BACKFLIP_LAND: Self = Self(0x0400_047A);

    // ========================================================================
    // Airborne
    // ========================================================================
    pub const JUMP: Self = Self(0x0300_0880);
    pub const DOUBLE_JUMP: Self = Self(0x0300_0881);
    pub const TRIPLE_JUMP: Self = Self(0x0100_0882);
    pub const BACKFLIP: Self = Self(0x0100_0883);
    pub const STEEP_JUMP: Self = Self(0x0300_0885);
    pub const WALL_KICK_AIR: Self = Self(0x0300_0886);
    pub const SIDE_FLIP: Self = Self(0x0100_0887);
    pub const LONG_JUMP: Self = Self(0x0300_0888);
    pub const WATER_JUMP: Self = Self(0x0100_0889);
    pub const DIVE: Self = Self(0x0188_088A);
    pub const FREEFALL: Self = Self(0x0100_088C);
    pub const TOP_OF_POLE_JUMP: Self = Self(0x0300_088D);
    pub const BUTT_SLIDE_AIR: Self = Self(0x0300_088E);
    pub const FLYING_TRIPLE_JUMP: Self = Self(0x0300_0894);
    pub const SHOT_FROM_CANNON: Self = Self(0x0088_0898);
    pub const FLYING: Self = Self(0x1088_0899);
    pub const RIDING_SHELL_JUMP: Self = Self(0x0281_089A);
    pub const RIDING_SHELL_FALL: Self = Self(0x0081_089B);
    pub const VERTICAL_WIND: Self = Self(0x1008_089C);
    pub const HOLD_JUMP: Self = Self(0x0300_08A0);
    pub const HOLD_FREEFALL: Self = Self(0x0100_08A1);
    pub const HOLD_BUTT_SLIDE_AIR: Self = Self(0x0100_08A2);
    pub const HOLD_WATER_JUMP: Self = Self(0x0100_08A3);
    pub const TWIRLING: Self = Self(0x1080_08A4);
    pub const FORWARD_ROLLOUT: Self = Self(0x0100_08A6);
    pub const AIR_HIT_WALL: Self = Self(0x0000_08A7);
    pub const RIDING_HOOT: Self = Self(0x0000_04A8);
    pub const GROUND_POUND: Self = Self(0x0080_08A9);
    pub const SLIDE_KICK: Self = Self(0x0180_08AA);
    pub const AIR_THROW: Self = Self(0x8300_08AB);
    pub const JUMP_KICK: Self = Self(0x0180_08AC);
    pub const BACKWARD_ROLLOUT: Self = Self(0x0100_08AD);
    pub const CRAZY_BOX_BOUNCE: Self = Self(0x0000_08AE);
    pub const SPECIAL_TRIPLE_JUMP: Self = Self(0x0300_08AF);
    pub const BACKWARD_AIR_KB: Self = Self(0x0102_08B0);
    pub const FORWARD_AIR_KB: Self = Self(0x0102_08B1);
    pub const HARD_FORWARD_AIR_KB: Self = Self(0x0102_08B2);
    pub const HARD_BACKWARD_AIR_KB: Self = Self(0x0102_08B3);
    pub const BURNING_JUMP: Self = Self(0x0102_08B4);
    pub const BURNING_FALL: Self = Self(0x0102_08B5);
    pub const SOFT_BONK: Self = Self(0x0102_08B6);
    pub const LAVA_BOOST: Self = Self(0x0102_08B7);
    pub const GETTING_BLOWN: Self = Self(0x0102_08B8);
    pub const THROWN_FORWARD: Self = Self(0x0102_08BD);
    pub const THROWN_BACKWARD: Self = Self(0x0102_08BE);

    // ========================================================================
    // Owned by other collaborators (water, cutscene, object, automatic)
    // ========================================================================
    pub const WATER_IDLE: Self = Self(0x3800_22C0);
    pub const WATER_PLUNGE: Self = Self(0x3000_22E2);
    pub const METAL_WATER_FALLING: Self = Self(0x0000_42F4);
    pub const HOLD_METAL_WATER_FALLING: Self = Self(0x0000_42F5);
    pub const STANDING_DEATH: Self = Self(0x0002_1311);
    pub const QUICKSAND_DEATH: Self = Self(0x0002_1312);
    pub const DEATH_ON_STOMACH: Self = Self(0x0002_1315);
    pub const DEATH_ON_BACK: Self = Self(0x0002_1316);
    pub const SPECIAL_DEATH_EXIT: Self = Self(0x0000_1324);
    pub const SHOCKED: Self = Self(0x0002_0338);
    pub const SQUISHED: Self = Self(0x0002_0339);
    pub const HEAD_STUCK_IN_GROUND: Self = Self(0x0002_033A);
    pub const BUTT_STUCK_IN_GROUND: Self = Self(0x0002_033B);
    pub const FEET_STUCK_IN_GROUND: Self = Self(0x0002_033C);
    pub const START_HANGING: Self = Self(0x0820_0348);
    pub const LEDGE_GRAB: Self = Self(0x0800_034B);
    pub const LEDGE_CLIMB_DOWN: Self = Self(0x0000_054F);
    pub const GRABBED: Self = Self(0x0002_0370);
    pub const PUNCHING: Self = Self(0x0080_0380);
    pub const PICKING_UP: Self = Self(0x0000_0383);
    pub const DIVE_PICKING_UP: Self = Self(0x0000_0385);
    pub const STOMACH_SLIDE_STOP: Self = Self(0x0000_0386);
    pub const PLACING_DOWN: Self = Self(0x0000_0387);
    pub const THROWING: Self = Self(0x8000_0588);
    pub const HEAVY_THROW: Self = Self(0x8000_0589);

    /// Action number without the flags.
    #[inline]
    pub fn number(self) -> u32 {
        self.0 & Self::ID_MASK
    }

    #[inline]
    pub fn group(self) -> ActionGroup {
        match self.0 & Self::GROUP_MASK {
            Self::GROUP_STATIONARY => ActionGroup::Stationary,
            Self::GROUP_MOVING => ActionGroup::Moving,
            Self::GROUP_AIRBORNE => ActionGroup::Airborne,
            Self::GROUP_SUBMERGED => ActionGroup::Submerged,
            Self::GROUP_CUTSCENE => ActionGroup::Cutscene,
            Self::GROUP_AUTOMATIC => ActionGroup::Automatic,
            _ => ActionGroup::Object,
        }
    }

    /// Check if any of the given flag bits are set.
    #[inline]
    pub fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self.has(Self::FLAG_AIR)
    }

    #[inline]
    pub fn is_invulnerable(self) -> bool {
        self.has(Self::FLAG_INVULNERABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups() {
        assert_eq!(ActionId::IDLE.group(), ActionGroup::Stationary);
        assert_eq!(ActionId::WALKING.group(), ActionGroup::Moving);
        assert_eq!(ActionId::JUMP.group(), ActionGroup::Airborne);
        assert_eq!(ActionId::WATER_IDLE.group(), ActionGroup::Submerged);
        assert_eq!(ActionId::STANDING_DEATH.group(), ActionGroup::Cutscene);
        assert_eq!(ActionId::LEDGE_GRAB.group(), ActionGroup::Automatic);
        assert_eq!(ActionId::PUNCHING.group(), ActionGroup::Object);
    }

    #[test]
    fn test_flags() {
        assert!(ActionId::JUMP.is_air());
        assert!(ActionId::JUMP.has(ActionId::FLAG_CONTROL_JUMP_HEIGHT));
        assert!(!ActionId::TRIPLE_JUMP.has(ActionId::FLAG_CONTROL_JUMP_HEIGHT));
        assert!(ActionId::SOFT_BONK.is_invulnerable());
        assert!(ActionId::RIDING_SHELL_GROUND.has(ActionId::FLAG_RIDING_SHELL));
        assert!(ActionId::AIR_THROW.has(ActionId::FLAG_THROWING));
        assert!(!ActionId::WALKING.is_air());
    }

    #[test]
    fn test_number_masks_flags() {
        assert_eq!(ActionId::JUMP.number(), 0x080);
        assert_eq!(ActionId::WALKING.number(), 0x040);
    }
}
