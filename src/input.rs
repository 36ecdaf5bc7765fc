use std::collections::HashSet;

use winit::keyboard::KeyCode;

use crate::config::{Config, ControlScheme};
use crate::map::Map;
use crate::player::Player;

/// Logical key a physical key is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
}

impl Action {
    /// W/S and arrows up/down move, Q/E and arrows left/right turn.
    /// A/D strafe or turn depending on the scheme.
    pub fn from_key(code: KeyCode, scheme: ControlScheme) -> Option<Self> {
        let action = match code {
            KeyCode::KeyW | KeyCode::ArrowUp => Action::Forward,
            KeyCode::KeyS | KeyCode::ArrowDown => Action::Backward,
            KeyCode::KeyQ | KeyCode::ArrowLeft => Action::TurnLeft,
            KeyCode::KeyE | KeyCode::ArrowRight => Action::TurnRight,
            KeyCode::KeyA => match scheme {
                ControlScheme::Strafe => Action::StrafeLeft,
                ControlScheme::Turn => Action::TurnLeft,
            },
            KeyCode::KeyD => match scheme {
                ControlScheme::Strafe => Action::StrafeRight,
                ControlScheme::Turn => Action::TurnRight,
            },
            _ => return None,
        };
        Some(action)
    }
}

/// Held keys and pointer motion gathered between two frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Horizontal pointer counts since the last frame.
    pub pointer_dx: f32,
    /// Cursor is grabbed by the window.
    pub captured: bool,
    pub keys_down: HashSet<KeyCode>,
}

impl InputState {
    /// Records a physical key change and rederives the action flags, so an
    /// action stays held while any key bound to it is still down.
    pub fn key(&mut self, code: KeyCode, pressed: bool, scheme: ControlScheme) {
        if pressed {
            self.keys_down.insert(code);
        } else {
            self.keys_down.remove(&code);
        }

        let held = |action| {
            self.keys_down
                .iter()
                .any(|&k| Action::from_key(k, scheme) == Some(action))
        };
        let flags = [
            held(Action::Forward),
            held(Action::Backward),
            held(Action::StrafeLeft),
            held(Action::StrafeRight),
            held(Action::TurnLeft),
            held(Action::TurnRight),
        ];
        [
            self.forward,
            self.backward,
            self.strafe_left,
            self.strafe_right,
            self.turn_left,
            self.turn_right,
        ] = flags;
    }

    pub fn add_pointer_motion(&mut self, dx: f64) {
        self.pointer_dx += dx as f32;
    }

    /// Drops every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        let captured = self.captured;
        *self = Self {
            captured,
            ..Self::default()
        };
    }
}

/// Applies one frame of input to the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controller {
    pub move_speed: f32,
    pub strafe_speed: f32,
    pub turn_speed: f32,
    pub pointer_sensitivity: f32,
    pub require_capture: bool,
}

impl Controller {
    pub fn from_config(config: &Config) -> Self {
        Self {
            move_speed: config.move_speed,
            strafe_speed: config.strafe_speed,
            turn_speed: config.turn_speed,
            pointer_sensitivity: config.pointer_sensitivity,
            require_capture: config.require_capture,
        }
    }

    /// Consumes the pointer delta and moves the player, rejecting any step
    /// that ends in a wall. Left wins over right and forward over backward.
    pub fn update(&self, input: &mut InputState, player: &mut Player, map: &Map) {
        let dx = std::mem::take(&mut input.pointer_dx);
        if input.captured || !self.require_capture {
            player.turn(dx * self.pointer_sensitivity);
        }

        if input.turn_left {
            player.turn(-self.turn_speed);
        } else if input.turn_right {
            player.turn(self.turn_speed);
        }

        if input.strafe_left {
            let [rx, ry] = player.right();
            player.try_move([-rx, -ry], self.strafe_speed, map);
        } else if input.strafe_right {
            let right = player.right();
            player.try_move(right, self.strafe_speed, map);
        }

        if input.forward {
            let fwd = player.forward();
            player.try_move(fwd, self.move_speed, map);
        } else if input.backward {
            let [fx, fy] = player.forward();
            player.try_move([-fx, -fy], self.move_speed, map);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller {
        Controller::from_config(&Config::default())
    }

    #[test]
    fn forward_wins_over_backward() {
        let map = Map::enclosed(16, 16);
        let mut player = Player::new([8.0, 8.0], 0.0);
        let mut input = InputState {
            forward: true,
            backward: true,
            ..InputState::default()
        };
        controller().update(&mut input, &mut player, &map);
        assert!((player.pos[1] - 8.1).abs() < 1e-6);
    }

    #[test]
    fn strafe_left_wins_and_moves_left_of_heading() {
        let map = Map::enclosed(16, 16);
        let mut player = Player::new([8.0, 8.0], 0.0);
        let mut input = InputState {
            strafe_left: true,
            strafe_right: true,
            ..InputState::default()
        };
        controller().update(&mut input, &mut player, &map);
        assert!((player.pos[0] - 7.95).abs() < 1e-6);
        assert!((player.pos[1] - 8.0).abs() < 1e-6);
    }

    #[test]
    fn step_into_wall_is_rejected() {
        let map = Map::enclosed(16, 16);
        let mut player = Player::new([8.0, 14.95], 0.0);
        let before = player.pos;
        let mut input = InputState {
            forward: true,
            ..InputState::default()
        };
        controller().update(&mut input, &mut player, &map);
        assert_eq!(player.pos, before);
    }

    #[test]
    fn blocked_axis_does_not_cancel_the_other() {
        let map = Map::enclosed(16, 16);
        // wall right in front, open to the right
        let mut player = Player::new([8.0, 14.95], 0.0);
        let mut input = InputState {
            forward: true,
            strafe_right: true,
            ..InputState::default()
        };
        controller().update(&mut input, &mut player, &map);
        assert!((player.pos[0] - 8.05).abs() < 1e-6);
        assert!((player.pos[1] - 14.95).abs() < 1e-6);
    }

    #[test]
    fn pointer_turns_only_while_captured() {
        let map = Map::enclosed(16, 16);
        let mut player = Player::new([8.0, 8.0], 0.0);
        let mut input = InputState::default();

        input.add_pointer_motion(100.0);
        controller().update(&mut input, &mut player, &map);
        assert_eq!(player.heading, 0.0);
        assert_eq!(input.pointer_dx, 0.0);

        input.captured = true;
        input.add_pointer_motion(100.0);
        controller().update(&mut input, &mut player, &map);
        assert!((player.heading - 0.1).abs() < 1e-6);
    }

    #[test]
    fn turn_scheme_binds_a_and_d_to_turning() {
        let mut config = Config::default();
        config.apply_scheme(ControlScheme::Turn);
        let scheme = config.scheme;
        assert_eq!(Action::from_key(KeyCode::KeyA, scheme), Some(Action::TurnLeft));
        assert_eq!(
            Action::from_key(KeyCode::KeyA, ControlScheme::Strafe),
            Some(Action::StrafeLeft)
        );
        assert_eq!(Action::from_key(KeyCode::KeyZ, scheme), None);

        let map = Map::enclosed(16, 16);
        let mut player = Player::new([8.0, 8.0], 0.0);
        let mut input = InputState::default();
        input.key(KeyCode::KeyA, true, scheme);
        input.add_pointer_motion(10.0);
        Controller::from_config(&config).update(&mut input, &mut player, &map);
        assert!((player.heading - (10.0 * 0.005 - 0.025)).abs() < 1e-6);
    }

    #[test]
    fn action_stays_held_until_its_last_key_is_released() {
        let mut input = InputState::default();
        let scheme = ControlScheme::Turn;

        input.key(KeyCode::KeyW, true, scheme);
        input.key(KeyCode::ArrowUp, true, scheme);
        input.key(KeyCode::ArrowUp, false, scheme);
        assert!(input.forward);
        input.key(KeyCode::KeyW, false, scheme);
        assert!(!input.forward);

        input.key(KeyCode::KeyA, true, scheme);
        input.key(KeyCode::KeyQ, true, scheme);
        input.key(KeyCode::KeyA, false, scheme);
        assert!(input.turn_left);
        assert!(!input.strafe_left);
        input.key(KeyCode::KeyQ, false, scheme);
        assert!(!input.turn_left);
    }

    #[test]
    fn unbound_keys_change_nothing() {
        let mut input = InputState::default();
        input.key(KeyCode::KeyZ, true, ControlScheme::Strafe);
        assert_eq!(input, InputState {
            keys_down: HashSet::from([KeyCode::KeyZ]),
            ..InputState::default()
        });
    }

    #[test]
    fn release_all_keeps_capture() {
        let mut input = InputState {
            forward: true,
            captured: true,
            pointer_dx: 3.0,
            ..InputState::default()
        };
        input.key(KeyCode::KeyS, true, ControlScheme::Strafe);
        input.release_all();
        assert!(input.captured);
        assert!(!input.forward);
        assert!(!input.backward);
        input.key(KeyCode::KeyW, false, ControlScheme::Strafe);
        assert!(!input.backward);
        assert_eq!(input.pointer_dx, 0.0);
    }
}
