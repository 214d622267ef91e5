use glam::Vec3;

/// Physical keys the game binds. Windowing backends translate their own key
/// codes into these before mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    R,
    Up,
    Down,
    Left,
    Right,
}

/// A high-level action produced from input, consumed by the game loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Push the marble along a world-space direction.
    Roll(Vec3),
    /// Orbit the camera by pitch/yaw deltas in radians.
    Orbit { pitch: f32, yaw: f32 },
    /// Teleport the marble back to its spawn point.
    ResetMarble,
    /// Bound key with nothing to do this frame.
    Noop,
}

impl Action {
    /// Default binding for a key, using the standard orbit step.
    pub fn from_key(key: Key) -> Self {
        InputMap::default().action_for(key)
    }
}

/// Maps held keys to actions, once per frame per key.
#[derive(Debug, Clone)]
pub struct InputMap {
    /// Radians of camera orbit per frame while an arrow key is held.
    pub orbit_step: f32,
}

impl Default for InputMap {
    fn default() -> Self {
        Self { orbit_step: 0.02 }
    }
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action for a single held key.
    pub fn action_for(&self, key: Key) -> Action {
        match key {
            Key::W => Action::Roll(Vec3::Z),
            Key::S => Action::Roll(Vec3::NEG_Z),
            Key::A => Action::Roll(Vec3::NEG_X),
            Key::D => Action::Roll(Vec3::X),
            Key::R => Action::ResetMarble,
            Key::Up => Action::Orbit { pitch: self.orbit_step, yaw: 0.0 },
            Key::Down => Action::Orbit { pitch: -self.orbit_step, yaw: 0.0 },
            Key::Left => Action::Orbit { pitch: 0.0, yaw: -self.orbit_step },
            Key::Right => Action::Orbit { pitch: 0.0, yaw: self.orbit_step },
        }
    }

    /// Fold a frame's held keys into actions. Roll directions combine into a
    /// single normalized push so diagonals are not faster.
    pub fn actions(&self, held: &[Key]) -> Vec<Action> {
        let mut roll = Vec3::ZERO;
        let mut out = Vec::new();
        for &key in held {
            match self.action_for(key) {
                Action::Roll(dir) => roll += dir,
                action => out.push(action),
            }
        }
        if roll != Vec3::ZERO {
            out.push(Action::Roll(roll.normalize()));
        }
        out
    }
}
