//! Ordered stack of held notes for monophonic legato playing.

/// Maximum number of simultaneously tracked notes.
pub const CAPACITY: usize = 64;

/// Insertion-ordered note stack. Re-inserting a held note moves it to the
/// back; when full, the oldest note is dropped.
#[derive(Debug)]
pub struct NoteStack {
    notes: [u8; CAPACITY],
    len: usize,
}

impl Default for NoteStack {
    fn default() -> Self {
        Self {
            notes: [0; CAPACITY],
            len: 0,
        }
    }
}

impl NoteStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `note` to the back, moving it there if already held.
    pub fn enqueue(&mut self, note: u8) {
        if let Some(pos) = self.position(note) {
            self.remove_at(pos);
        } else if self.len == CAPACITY {
            self.remove_at(0);
        }
        self.notes[self.len] = note;
        self.len += 1;
    }

    /// Removes `note` and returns the note now on top, or `None` when the
    /// stack became empty.
    pub fn dequeue(&mut self, note: u8) -> Option<u8> {
        if let Some(pos) = self.position(note) {
            self.remove_at(pos);
        }
        self.top()
    }

    pub fn top(&self) -> Option<u8> {
        if self.len == 0 {
            None
        } else {
            Some(self.notes[self.len - 1])
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn position(&self, note: u8) -> Option<usize> {
        self.notes[..self.len].iter().position(|&n| n == note)
    }

    fn remove_at(&mut self, pos: usize) {
        self.notes.copy_within(pos + 1..self.len, pos);
        self.len -= 1;
    }
}
