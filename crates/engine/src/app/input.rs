#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn release_all(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::Forward,
        InputAction::Backward,
        InputAction::Left,
        InputAction::Right,
        InputAction::Jump,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::Forward => 0,
            InputAction::Backward => 1,
            InputAction::Left => 2,
            InputAction::Right => 3,
            InputAction::Jump => 4,
        }
    }
}

/// Raw pointer motion gathered between two ticks.
///
/// Deltas are only accepted while the pointer is locked; anything that arrives
/// while unlocked is dropped on the floor rather than queued for later.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PointerAccumulator {
    locked: bool,
    pending_dx: f32,
    pending_dy: f32,
}

impl PointerAccumulator {
    pub(crate) fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if !locked {
            self.pending_dx = 0.0;
            self.pending_dy = 0.0;
        }
    }

    pub(crate) fn push_delta(&mut self, dx: f32, dy: f32) {
        if !self.locked || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.pending_dx += dx;
        self.pending_dy += dy;
    }

    pub(crate) fn drain(&mut self) -> (f32, f32) {
        let delta = (self.pending_dx, self.pending_dy);
        self.pending_dx = 0.0;
        self.pending_dy = 0.0;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_outside_lock_are_ignored() {
        let mut pointer = PointerAccumulator::default();
        pointer.push_delta(10.0, 4.0);
        assert_eq!(pointer.drain(), (0.0, 0.0));
    }

    #[test]
    fn locked_deltas_accumulate_until_drained() {
        let mut pointer = PointerAccumulator::default();
        pointer.set_locked(true);
        pointer.push_delta(3.0, -1.0);
        pointer.push_delta(2.0, 5.0);

        assert_eq!(pointer.drain(), (5.0, 4.0));
        assert_eq!(pointer.drain(), (0.0, 0.0));
    }

    #[test]
    fn unlocking_discards_pending_motion() {
        let mut pointer = PointerAccumulator::default();
        pointer.set_locked(true);
        pointer.push_delta(7.0, 7.0);
        pointer.set_locked(false);

        assert!(!pointer.is_locked());
        assert_eq!(pointer.drain(), (0.0, 0.0));
    }

    #[test]
    fn release_all_clears_held_actions() {
        let mut states = ActionStates::default();
        for action in InputAction::ALL {
            states.set(action, true);
        }
        states.release_all();
        assert!(InputAction::ALL.iter().all(|action| !states.is_down(*action)));
    }
}
