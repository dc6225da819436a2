//! Animation cursor.
//!
//! Actions pick a clip and sometimes a playback rate every frame; the
//! controller advances the cursor once at the end of the frame. Frame
//! positions are tracked in 16.16 fixed point so that fractional playback
//! rates accumulate exactly.

use serde::{Deserialize, Serialize};

/// Playback rate of `1.0` in 16.16 fixed point.
pub const ANIM_RATE_ONE: i32 = 0x10000;

/// Animation clips referenced by the movement actions.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimId {
    // Standing
    IdleHeadLeft,
    IdleHeadRight,
    IdleHeadCenter,
    WalkPanting,
    IdleInQuicksand,
    DyingInQuicksand,
    FirstPerson,
    StandAgainstWall,
    IdleWithLightObj,
    IdleHeavyObj,
    Crouching,
    StartCrouching,
    StopCrouching,
    StartCrawling,
    StopCrawling,
    StopSkid,
    StopSlide,
    StopSlideLightObj,
    TwirlLand,
    GroundPoundLanding,
    SlideKickStop,
    SlowLandFromDive,
    APose,
    StandUpFromLavaBoost,

    // Ground movement
    StartTiptoe,
    Tiptoe,
    Walking,
    Running,
    MoveInQuicksand,
    Pushing,
    SidestepLeft,
    SidestepRight,
    SkidOnGround,
    TurningPart1,
    TurningPart2,
    Crawling,
    SlowWalkWithLightObj,
    WalkWithLightObj,
    RunWithLightObj,
    WalkWithHeavyObj,
    StartRidingShell,
    RidingShell,
    Slide,
    SlideDive,
    SlideKick,
    SlidingOnBottomWithLightObj,
    ClimbDownLedge,
    FirstPunch,
    FirstPunchFast,
    SecondPunch,
    SecondPunchFast,
    GroundKick,
    Breakdance,

    // Landings and knockback
    LandFromSingleJump,
    LandFromDoubleJump,
    GeneralLand,
    SlideflipLand,
    TripleJumpLand,
    JumpLandWithLightObj,
    FallLandWithLightObj,
    CrouchFromFastLongjump,
    CrouchFromSlowLongjump,
    FallOverBackwards,
    LandOnStomach,
    BackwardKb,
    ForwardKb,
    SoftBackKb,
    SoftFrontKb,
    GroundBonk,

    // Airborne
    SingleJump,
    DoubleJumpRise,
    DoubleJumpFall,
    TripleJump,
    Backflip,
    Slideflip,
    Slidejump,
    GeneralFall,
    FallFromSlide,
    FallFromSlideKick,
    FallWithLightObj,
    FallFromSlidingWithLightObj,
    JumpWithLightObj,
    FastLongjump,
    SlowLongjump,
    Dive,
    AirKick,
    ThrowLightObject,
    JumpRidingShell,
    StartTwirl,
    Twirl,
    StartWallkick,
    ForwardSpinning,
    BackwardSpinning,
    ForwardSpinningFlip,
    TripleJumpFly,
    TripleJumpGroundPound,
    StartGroundPound,
    GroundPound,
    BackwardAirKb,
    AirForwardKb,
    AirborneOnStomach,
    FireLavaBurn,
    HandstandJump,
    FlyFromCannon,
    WingCapFly,
    HangOnCeiling,
    HangOnOwl,
    IdleOnLedge,
}

/// Loop points of a clip, in whole frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimClip {
    pub loop_start: i16,
    pub loop_end: i16,
    /// Non-looping clips hold their last frame.
    pub looping: bool,
}

impl AnimClip {
    const fn once(loop_end: i16) -> Self {
        Self {
            loop_start: 0,
            loop_end,
            looping: false,
        }
    }

    const fn looped(loop_start: i16, loop_end: i16) -> Self {
        Self {
            loop_start,
            loop_end,
            looping: true,
        }
    }
}

impl AnimId {
    /// Loop points of the default clip set.
    pub fn clip(self) -> AnimClip {
        use AnimId::*;
        match self {
            IdleHeadLeft | IdleHeadRight | IdleHeadCenter => AnimClip::looped(0, 60),
            IdleWithLightObj | IdleHeavyObj => AnimClip::looped(0, 60),
            WalkPanting => AnimClip::looped(0, 50),
            IdleInQuicksand | DyingInQuicksand => AnimClip::looped(0, 60),
            FirstPerson | StandAgainstWall => AnimClip::looped(0, 30),
            Crouching => AnimClip::looped(0, 40),
            StartCrouching | StopCrouching => AnimClip::once(10),
            StartCrawling | StopCrawling => AnimClip::once(15),
            StopSkid | StopSlide | StopSlideLightObj | SlideKickStop => AnimClip::once(20),
            TwirlLand => AnimClip::once(24),
            GroundPoundLanding => AnimClip::once(18),
            SlowLandFromDive => AnimClip::once(20),
            APose => AnimClip::looped(0, 1),
            StandUpFromLavaBoost => AnimClip::once(40),

            StartTiptoe => AnimClip::looped(24, 32),
            Tiptoe => AnimClip::looped(0, 96),
            Walking => AnimClip::looped(0, 72),
            Running => AnimClip::looped(0, 54),
            MoveInQuicksand => AnimClip::looped(0, 120),
            Pushing => AnimClip::looped(0, 24),
            SidestepLeft | SidestepRight => AnimClip::looped(0, 40),
            SkidOnGround => AnimClip::looped(0, 16),
            TurningPart1 => AnimClip::once(10),
            TurningPart2 => AnimClip::once(12),
            Crawling => AnimClip::looped(0, 100),
            SlowWalkWithLightObj | WalkWithLightObj => AnimClip::looped(0, 80),
            RunWithLightObj => AnimClip::looped(0, 54),
            WalkWithHeavyObj => AnimClip::looped(0, 96),
            StartRidingShell => AnimClip::once(16),
            RidingShell => AnimClip::looped(0, 40),
            Slide | SlideDive | SlidingOnBottomWithLightObj => AnimClip::looped(0, 20),
            SlideKick => AnimClip::once(20),
            ClimbDownLedge => AnimClip::once(30),
            FirstPunch | SecondPunch => AnimClip::once(6),
            FirstPunchFast | SecondPunchFast => AnimClip::once(8),
            GroundKick => AnimClip::once(20),
            Breakdance => AnimClip::once(30),

            LandFromSingleJump | LandFromDoubleJump | GeneralLand => AnimClip::once(14),
            SlideflipLand | TripleJumpLand => AnimClip::once(24),
            JumpLandWithLightObj | FallLandWithLightObj => AnimClip::once(14),
            CrouchFromFastLongjump | CrouchFromSlowLongjump => AnimClip::once(20),
            FallOverBackwards => AnimClip::once(72),
            LandOnStomach => AnimClip::once(40),
            BackwardKb => AnimClip::once(36),
            ForwardKb => AnimClip::once(32),
            SoftBackKb | SoftFrontKb => AnimClip::once(36),
            GroundBonk => AnimClip::once(50),

            SingleJump | DoubleJumpRise | TripleJump => AnimClip::once(30),
            DoubleJumpFall => AnimClip::looped(0, 20),
            Backflip | Slideflip => AnimClip::once(36),
            Slidejump => AnimClip::once(20),
            GeneralFall | FallFromSlide | FallFromSlideKick => AnimClip::looped(0, 12),
            FallWithLightObj | FallFromSlidingWithLightObj => AnimClip::looped(0, 12),
            JumpWithLightObj => AnimClip::once(24),
            FastLongjump | SlowLongjump => AnimClip::once(30),
            Dive => AnimClip::once(20),
            AirKick => AnimClip::once(20),
            ThrowLightObject => AnimClip::once(18),
            JumpRidingShell => AnimClip::once(20),
            StartTwirl => AnimClip::once(10),
            Twirl => AnimClip::looped(0, 16),
            StartWallkick => AnimClip::once(12),
            ForwardSpinning | BackwardSpinning => AnimClip::looped(0, 12),
            ForwardSpinningFlip => AnimClip::once(16),
            TripleJumpFly => AnimClip::once(20),
            TripleJumpGroundPound | StartGroundPound => AnimClip::once(8),
            GroundPound => AnimClip::looped(0, 4),
            BackwardAirKb | AirForwardKb => AnimClip::once(20),
            AirborneOnStomach => AnimClip::looped(0, 20),
            FireLavaBurn => AnimClip::looped(0, 30),
            HandstandJump => AnimClip::once(20),
            FlyFromCannon => AnimClip::looped(0, 20),
            WingCapFly => AnimClip::looped(0, 40),
            HangOnCeiling => AnimClip::once(20),
            HangOnOwl => AnimClip::looped(0, 30),
            IdleOnLedge => AnimClip::looped(0, 40),
        }
    }
}

/// Current clip and playback position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationCursor {
    id: Option<AnimId>,
    clip: AnimClip,
    /// Position in 16.16 fixed point.
    assist: i32,
    /// Playback rate; `0` plays at one frame per tick.
    accel: i32,
}

impl Default for AnimationCursor {
    fn default() -> Self {
        Self {
            id: None,
            clip: AnimClip::once(1),
            assist: 0,
            accel: 0,
        }
    }
}

impl AnimationCursor {
    pub fn id(&self) -> Option<AnimId> {
        self.id
    }

    pub fn clip(&self) -> AnimClip {
        self.clip
    }

    #[inline]
    pub fn frame(&self) -> i16 {
        (self.assist >> 16) as i16
    }

    pub fn accel(&self) -> i32 {
        self.accel
    }

    /// Forget the current clip so the next `set` restarts it.
    pub fn invalidate(&mut self) {
        self.id = None;
    }

    /// Switch to `id` at the default rate and return the current frame.
    ///
    /// Setting the clip that is already playing leaves the cursor alone.
    pub fn set(&mut self, id: AnimId) -> i16 {
        if self.id != Some(id) {
            self.id = Some(id);
            self.clip = id.clip();
            self.accel = 0;
            self.assist = (i32::from(self.clip.loop_start) - 1) << 16;
        }
        self.frame()
    }

    /// Switch to `id` with a playback rate in 16.16 fixed point.
    pub fn set_with_accel(&mut self, id: AnimId, accel: i32) -> i16 {
        if self.id != Some(id) {
            self.id = Some(id);
            self.clip = id.clip();
            self.assist = (i32::from(self.clip.loop_start) << 16) - accel;
        }
        self.accel = accel;
        self.frame()
    }

    /// Jump to `frame`; the next advance lands one step past it.
    pub fn set_to_frame(&mut self, frame: i16) {
        if self.accel != 0 {
            self.assist = (i32::from(frame) << 16) + self.accel;
        } else {
            self.assist = (i32::from(frame) + 1) << 16;
        }
    }

    /// Step one tick.
    pub fn advance(&mut self) {
        let rate = if self.accel != 0 { self.accel } else { ANIM_RATE_ONE };
        let next = self.assist.saturating_add(rate);

        self.assist = if (next >> 16) >= i32::from(self.clip.loop_end) {
            if self.clip.looping && self.clip.loop_start < self.clip.loop_end {
                i32::from(self.clip.loop_start) << 16
            } else {
                (i32::from(self.clip.loop_end) - 1) << 16
            }
        } else {
            next
        };
    }

    /// Last frame of the clip is showing.
    pub fn is_at_end(&self) -> bool {
        i32::from(self.frame()) + 1 == i32::from(self.clip.loop_end)
    }

    /// Within two frames of the end.
    pub fn is_past_end(&self) -> bool {
        i32::from(self.frame()) >= i32::from(self.clip.loop_end) - 2
    }

    /// The cursor crosses `frame` on this tick.
    pub fn is_past_frame(&self, frame: i16) -> bool {
        if self.accel != 0 {
            let target = i32::from(frame) << 16;
            self.assist > target && target >= self.assist - self.accel
        } else {
            i32::from(self.frame()) + 1 == i32::from(frame)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_starts_before_first_frame() {
        let mut cursor = AnimationCursor::default();
        assert_eq!(cursor.set(AnimId::SingleJump), -1);
        cursor.advance();
        assert_eq!(cursor.set(AnimId::SingleJump), 0);
    }

    #[test]
    fn test_once_holds_last_frame() {
        let mut cursor = AnimationCursor::default();
        cursor.set(AnimId::TurningPart2);
        for _ in 0..100 {
            cursor.advance();
        }
        assert_eq!(cursor.frame(), 11);
        assert!(cursor.is_at_end());
        assert!(cursor.is_past_end());
    }

    #[test]
    fn test_looped_wraps() {
        let mut cursor = AnimationCursor::default();
        cursor.set(AnimId::GroundPound);
        for _ in 0..5 {
            cursor.advance();
        }
        // -1 -> 0 1 2 3 -> 0
        assert_eq!(cursor.frame(), 0);
    }

    #[test]
    fn test_accel_plays_faster() {
        let mut cursor = AnimationCursor::default();
        cursor.set_with_accel(AnimId::Walking, 2 * ANIM_RATE_ONE);
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.frame(), 2);
        assert!(cursor.is_past_frame(1));
        assert!(!cursor.is_past_frame(4));
    }

    #[test]
    fn test_set_to_frame() {
        let mut cursor = AnimationCursor::default();
        cursor.set(AnimId::Dive);
        cursor.set_to_frame(7);
        assert_eq!(cursor.frame(), 8);
    }

    #[test]
    fn test_same_clip_keeps_position() {
        let mut cursor = AnimationCursor::default();
        cursor.set(AnimId::Walking);
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.set(AnimId::Walking), 1);
        cursor.invalidate();
        assert_eq!(cursor.set(AnimId::Walking), -1);
    }
}
