//! Player input handling.
//!
//! This module converts raw controller input (stick counts, buttons, camera
//! yaw) into commands for the physics system.

use hopper_physics::movement::{AvatarCommand, Buttons};
use hopper_physics::Angle;
use serde::{Deserialize, Serialize};

/// Raw stick counts inside this range read as centered.
const STICK_DEAD_ZONE: f32 = 8.0;

/// Raw counts past the dead zone are shifted down by this much.
const STICK_DEAD_ZONE_SHIFT: f32 = 6.0;

const STICK_MAX: f32 = 64.0;

/// Raw player input for a single frame.
///
/// This is the input format received from the client input system.
/// It gets converted to [`AvatarCommand`] for the physics system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Raw stick counts, roughly `[-80, 80]` on each axis. Up is positive Y.
    pub stick: (f32, f32),

    /// Buttons held this frame.
    pub buttons: ButtonInput,

    /// Yaw from the avatar toward the camera. Pushing the stick up walks
    /// away from the camera.
    pub camera_yaw: Angle,

    /// The camera is in first-person mode.
    pub first_person: bool,

    /// Frame number this input was generated.
    pub frame: u32,
}

/// Button states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonInput {
    /// A: jump.
    pub jump: bool,
    /// B: punch, dive, kick.
    pub attack: bool,
    /// Z: crouch, ground pound.
    pub crouch: bool,
}

impl ButtonInput {
    fn to_buttons(self) -> Buttons {
        let mut buttons = Buttons::default();
        if self.jump {
            buttons.press(Buttons::A);
        }
        if self.attack {
            buttons.press(Buttons::B);
        }
        if self.crouch {
            buttons.press(Buttons::Z);
        }
        buttons
    }
}

/// Remove the dead zone and cap the deflection at 64.
pub fn adjust_stick(raw_x: f32, raw_y: f32) -> (f32, f32) {
    let shift = |raw: f32| {
        if raw.abs() < STICK_DEAD_ZONE {
            0.0
        } else {
            raw - STICK_DEAD_ZONE_SHIFT * raw.signum()
        }
    };
    let (x, y) = (shift(raw_x), shift(raw_y));

    let mag = (x * x + y * y).sqrt();
    if mag > STICK_MAX {
        (x * STICK_MAX / mag, y * STICK_MAX / mag)
    } else {
        (x, y)
    }
}

impl PlayerInput {
    /// Convert to a physics command.
    ///
    /// `previous` is the input of the frame before and decides which buttons
    /// were pressed this frame rather than held.
    pub fn to_command(&self, previous: &PlayerInput) -> AvatarCommand {
        let (stick_x, stick_y) = adjust_stick(self.stick.0, self.stick.1);
        let down = self.buttons.to_buttons();
        let held_before = previous.buttons.to_buttons();

        AvatarCommand {
            stick_x,
            stick_y,
            pressed: Buttons(down.0 & !held_before.0),
            down,
            camera_yaw: self.camera_yaw,
            first_person: self.first_person,
        }
    }

    /// Check if the stick is pushed past the dead zone.
    pub fn has_movement(&self) -> bool {
        adjust_stick(self.stick.0, self.stick.1) != (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_zone() {
        assert_eq!(adjust_stick(7.0, -7.0), (0.0, 0.0));
        assert_eq!(adjust_stick(20.0, 0.0), (14.0, 0.0));
        assert_eq!(adjust_stick(0.0, -20.0), (0.0, -14.0));
    }

    #[test]
    fn test_stick_capped_at_64() {
        let (x, y) = adjust_stick(80.0, 80.0);
        assert!(((x * x + y * y).sqrt() - 64.0).abs() < 1e-3);
        assert!((x - y).abs() < 1e-3);

        let (x, y) = adjust_stick(0.0, 80.0);
        assert_eq!((x, y), (0.0, 64.0));
    }

    #[test]
    fn test_press_only_on_first_frame() {
        let idle = PlayerInput::default();
        let mut jumping = PlayerInput::default();
        jumping.buttons.jump = true;

        let cmd = jumping.to_command(&idle);
        assert!(cmd.pressed.pressed(Buttons::A));
        assert!(cmd.down.pressed(Buttons::A));

        // Held on the next frame
        let cmd = jumping.to_command(&jumping);
        assert!(!cmd.pressed.pressed(Buttons::A));
        assert!(cmd.down.pressed(Buttons::A));
    }

    #[test]
    fn test_camera_and_first_person_pass_through() {
        let input = PlayerInput {
            stick: (0.0, 70.0),
            camera_yaw: Angle::HALF,
            first_person: true,
            ..Default::default()
        };
        let cmd = input.to_command(&PlayerInput::default());
        assert_eq!(cmd.camera_yaw, Angle::HALF);
        assert!(cmd.first_person);
        assert_eq!(cmd.stick_y, 64.0);
        assert!(input.has_movement());
    }
}
