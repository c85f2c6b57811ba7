//! Shared test doubles: a scripted key source and key-list builders.

use std::collections::VecDeque;
use std::io;

use k_term::input::{Key, KeySource};

/// A `KeySource` that replays a fixed key sequence.
///
/// Running out of keys is an error: a test that reads more keys than it
/// scripted has looped somewhere it should not have.
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Remaining unread keys.
    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> io::Result<Key> {
        self.keys.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted")
        })
    }
}

/// Each byte of `text` as a literal key.
pub fn typed(text: &[u8]) -> Vec<Key> {
    text.iter().map(|&b| Key::Char(b)).collect()
}
