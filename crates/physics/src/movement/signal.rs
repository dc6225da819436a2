//! Outbound notifications.
//!
//! The movement core never plays audio, spawns particles or moves the
//! camera itself. It records what happened in [`Signals`] and whoever owns
//! the avatar drains them after the frame.

use serde::{Deserialize, Serialize};

/// Sound cues emitted by actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    // Body sounds
    TerrainJump,
    TerrainLanding,
    TerrainHeavyLanding,
    TerrainBodyHitGround,
    TerrainStep,
    TerrainStepTiptoe,
    MetalJump,
    MetalLanding,
    MetalHeavyLanding,
    MetalStep,
    MetalStepTiptoe,
    QuicksandStep,
    Bonk,
    MetalBonk,
    Hit,
    Spin,
    SideFlip,
    Twirl,
    Throw,
    WaterJump,
    FlyingFast,

    // Looping movement sounds
    TerrainSlide,
    TerrainRidingShell,
    RidingShellLava,
    LavaBurn,
    Flying,
    FlameOut,
    CrazyBoxBoingSlow,
    CrazyBoxBoingFast,

    // Voice
    YahWahHoo,
    YahooWahaYippee,
    Yahoo,
    Hoohoo,
    Haha,
    HereWeGo,
    Waaaooow,
    Doh,
    Uh,
    UhLongJumpLand,
    Ooof,
    Attacked,
    OnFire,
    MamaMia,
    GroundPoundWah,
    PunchYah,
    PunchWah,
    PunchHoo,
    Wah,
    Panting,
}

/// Particle emitters requested this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleFlags(pub u32);

impl ParticleFlags {
    pub const DUST: u32 = 1 << 0;
    pub const VERTICAL_STAR: u32 = 1 << 1;
    pub const SPARKLES: u32 = 1 << 3;
    pub const HORIZONTAL_STAR: u32 = 1 << 4;
    pub const WAVE_TRAIL: u32 = 1 << 10;
    pub const FIRE: u32 = 1 << 11;
    pub const MIST_CIRCLE: u32 = 1 << 16;

    #[inline]
    pub fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    #[inline]
    pub fn set(&mut self, flag: u32, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

/// Camera shake requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraShake {
    GroundPound,
    FallDamage,
}

/// Everything the collaborators need to act on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Signal {
    Sound(Sound),
    CameraShake(CameraShake),
    /// Return the camera to its default behind-the-avatar mode.
    ResetCameraMode,
    /// Switch the camera to its wide flying follow mode.
    FlyingCameraMode,
    /// The held object was let go.
    DropHeldObject,
    /// The held object was thrown.
    ThrowHeldObject,
    /// The ridden object (shell, owl) was released.
    StopRiding,
    /// The object in front of the avatar should be picked up.
    GrabObject,
    /// The cap was blown off the avatar's head.
    CapBlownOff,
    /// The avatar stepped on a warp floor.
    Warp { node: u8 },
    /// The avatar died or fell off the level.
    Death,
}

/// Per-frame outbound queue.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    pub events: Vec<Signal>,
    pub particles: ParticleFlags,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn sound(&mut self, sound: Sound) {
        self.events.push(Signal::Sound(sound));
    }

    #[inline]
    pub fn push(&mut self, signal: Signal) {
        self.events.push(signal);
    }

    #[inline]
    pub fn particle(&mut self, flag: u32) {
        self.particles.set(flag, true);
    }

    /// Check whether a given signal was emitted.
    pub fn contains(&self, signal: Signal) -> bool {
        self.events.contains(&signal)
    }

    pub fn played(&self, sound: Sound) -> bool {
        self.contains(Signal::Sound(sound))
    }

    /// Take the queued events and reset for the next frame.
    pub fn drain(&mut self) -> Vec<Signal> {
        self.particles = ParticleFlags::default();
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_resets() {
        let mut signals = Signals::new();
        signals.sound(Sound::Yahoo);
        signals.particle(ParticleFlags::DUST);
        assert!(signals.played(Sound::Yahoo));
        assert!(signals.particles.has(ParticleFlags::DUST));

        let events = signals.drain();
        assert_eq!(events, vec![Signal::Sound(Sound::Yahoo)]);
        assert!(signals.events.is_empty());
        assert_eq!(signals.particles, ParticleFlags::default());
    }
}
