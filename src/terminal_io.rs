use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use log::error;

use crate::types::Controls;

/// Discrete requests the frame loop reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Restart,
    Resize(u16, u16),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    fn index(self) -> usize {
        self as usize
    }

    /// Arrow keys and WASD.
    pub fn from_key(code: KeyCode) -> Option<Direction> {
        match code {
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'a' => Some(Direction::Left),
                'd' => Some(Direction::Right),
                'w' => Some(Direction::Up),
                's' => Some(Direction::Down),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Which directions are held. Terminals that report key releases give exact
/// state; otherwise a key counts as held for `hold_frames` after its last
/// press or auto-repeat.
pub struct KeyState {
    last_pressed: [Option<u64>; 4],
    hold_frames: u64,
    releases_reported: bool,
}

impl KeyState {
    pub fn new(hold_frames: u64) -> Self {
        KeyState { last_pressed: [None; 4], hold_frames, releases_reported: false }
    }

    pub fn press(&mut self, direction: Direction, frame: u64) {
        self.last_pressed[direction.index()] = Some(frame);
    }

    pub fn release(&mut self, direction: Direction) {
        self.releases_reported = true;
        self.last_pressed[direction.index()] = None;
    }

    pub fn is_held(&self, direction: Direction, frame: u64) -> bool {
        match self.last_pressed[direction.index()] {
            Some(pressed) => self.releases_reported || frame.saturating_sub(pressed) < self.hold_frames,
            None => false,
        }
    }

    pub fn controls(&self, frame: u64) -> Controls {
        Controls {
            left: self.is_held(Direction::Left, frame),
            right: self.is_held(Direction::Right, frame),
            up: self.is_held(Direction::Up, frame),
            down: self.is_held(Direction::Down, frame),
        }
    }

    pub fn clear(&mut self) {
        self.last_pressed = [None; 4];
    }
}

/// Updates key state from one terminal event and returns any command it carries.
/// Quit: `q`, Esc, Ctrl-C. Restart: any mouse button, or `r`/Enter.
pub fn handle_event(event: &Event, keys: &mut KeyState, frame: u64) -> Option<Command> {
    match event {
        Event::Key(key_event) => {
            if key_event.kind == KeyEventKind::Release {
                if let Some(direction) = Direction::from_key(key_event.code) {
                    keys.release(direction);
                }
                return None;
            }
            match key_event.code {
                KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
                KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => Some(Command::Restart),
                code => {
                    if let Some(direction) = Direction::from_key(code) {
                        keys.press(direction, frame);
                    }
                    None
                }
            }
        }
        Event::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::Down(_) => Some(Command::Restart),
            _ => None,
        },
        Event::Resize(width, height) => Some(Command::Resize(*width, *height)),
        _ => None,
    }
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, VecDeque<Event>>,
    current_frame: u64,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        let events = events.into_iter().map(|(frame, list)| (frame, list.into())).collect();
        SimulatedInput { events, current_frame: 0 }
    }

    /// Flies right, then up, clicks while still playing (ignored) and quits.
    pub fn demo_script() -> Self {
        let mut script: HashMap<u64, Vec<Event>> = HashMap::new();
        for frame in 1..40 {
            script.entry(frame).or_default().push(key(KeyCode::Right));
        }
        for frame in 40..80 {
            script.entry(frame).or_default().push(key(KeyCode::Char('w')));
        }
        script.entry(80).or_default().push(mouse_down());
        script.entry(240).or_default().push(key(KeyCode::Char('q')));
        SimulatedInput::new(script)
    }

    pub fn poll(&mut self, frame_count: u64) -> io::Result<bool> {
        self.current_frame = frame_count;
        Ok(self.events.get(&frame_count).is_some_and(|queue| !queue.is_empty()))
    }

    pub fn read(&mut self) -> io::Result<Event> {
        if let Some(event) = self.events.get_mut(&self.current_frame).and_then(VecDeque::pop_front) {
            Ok(event)
        } else {
            Ok(Event::Key(KeyCode::Null.into()))
        }
    }
}

/// Where frame input comes from: the live terminal or a script.
pub enum InputSource {
    Terminal,
    Simulated(SimulatedInput),
}

impl InputSource {
    /// Next pending event for this frame, never blocking.
    pub fn next_event(&mut self, frame_count: u64) -> io::Result<Option<Event>> {
        match self {
            InputSource::Terminal => {
                if event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
                    Ok(Some(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?))
                } else {
                    Ok(None)
                }
            }
            InputSource::Simulated(sim_input) => {
                if sim_input.poll(frame_count)? {
                    Ok(Some(sim_input.read()?))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

pub fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::from(code))
}

pub fn mouse_down() -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 0,
        row: 0,
        modifiers: KeyModifiers::NONE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn release(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn arrows_and_wasd_map_to_directions() {
        assert_eq!(Direction::from_key(KeyCode::Left), Some(Direction::Left));
        assert_eq!(Direction::from_key(KeyCode::Char('D')), Some(Direction::Right));
        assert_eq!(Direction::from_key(KeyCode::Char('w')), Some(Direction::Up));
        assert_eq!(Direction::from_key(KeyCode::Char('s')), Some(Direction::Down));
        assert_eq!(Direction::from_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn press_without_release_decays() {
        let mut keys = KeyState::new(3);
        assert_eq!(handle_event(&key(KeyCode::Left), &mut keys, 10), None);
        assert!(keys.controls(12).left);
        assert!(!keys.controls(13).left);
    }

    #[test]
    fn reported_release_gives_exact_hold() {
        let mut keys = KeyState::new(3);
        handle_event(&key(KeyCode::Char('a')), &mut keys, 1);
        handle_event(&key(KeyCode::Up), &mut keys, 1);
        handle_event(&release(KeyCode::Char('a')), &mut keys, 2);
        // Up stays held long past the decay window once releases are known.
        let controls = keys.controls(100);
        assert!(!controls.left);
        assert!(controls.up);
    }

    #[test]
    fn commands_from_keys_and_mouse() {
        let mut keys = KeyState::new(3);
        assert_eq!(handle_event(&key(KeyCode::Char('q')), &mut keys, 0), Some(Command::Quit));
        assert_eq!(handle_event(&key(KeyCode::Esc), &mut keys, 0), Some(Command::Quit));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(handle_event(&ctrl_c, &mut keys, 0), Some(Command::Quit));
        assert_eq!(handle_event(&mouse_down(), &mut keys, 0), Some(Command::Restart));
        assert_eq!(handle_event(&key(KeyCode::Enter), &mut keys, 0), Some(Command::Restart));
        assert_eq!(handle_event(&Event::Resize(100, 30), &mut keys, 0), Some(Command::Resize(100, 30)));
    }

    #[test]
    fn simulated_input_replays_per_frame() {
        let mut script = HashMap::new();
        script.insert(2, vec![key(KeyCode::Up), mouse_down()]);
        let mut input = InputSource::Simulated(SimulatedInput::new(script));
        assert_eq!(input.next_event(1).unwrap(), None);
        assert_eq!(input.next_event(2).unwrap(), Some(key(KeyCode::Up)));
        assert_eq!(input.next_event(2).unwrap(), Some(mouse_down()));
        assert_eq!(input.next_event(2).unwrap(), None);
    }
}
