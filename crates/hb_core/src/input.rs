use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    D,
    W,
    Space,
    Enter,
    Escape,
}

impl Key {
    /// Parse a key name as written in binding files.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Self::Left,
            "RIGHT" => Self::Right,
            "UP" => Self::Up,
            "DOWN" => Self::Down,
            "A" => Self::A,
            "D" => Self::D,
            "W" => Self::W,
            "SPACE" => Self::Space,
            "ENTER" => Self::Enter,
            "ESCAPE" | "ESC" => Self::Escape,
            _ => return None,
        };
        Some(key)
    }
}

/// Keys currently held. Controllers derive their own edges from this.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Drive a key from a boolean sample, e.g. one replay frame.
    pub fn set_key(&mut self, key: Key, down: bool) {
        if down {
            self.key_down(key);
        } else {
            self.key_up(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_up(&self, key: Key) -> bool {
        !self.held.contains(&key)
    }
}
