//! Tests for the held-note stack

use lazerbass_dsp::note_stack::{NoteStack, CAPACITY};

#[test]
fn last_note_wins() {
    let mut stack = NoteStack::new();

    stack.enqueue(48);
    stack.enqueue(52);
    stack.enqueue(55);
    assert_eq!(stack.top(), Some(55));
    assert_eq!(stack.len(), 3);
}

#[test]
fn dequeue_returns_previous_note() {
    let mut stack = NoteStack::new();

    stack.enqueue(48);
    stack.enqueue(52);

    assert_eq!(stack.dequeue(52), Some(48));
    assert_eq!(stack.dequeue(48), None);
    assert!(stack.is_empty());
}

#[test]
fn dequeue_inner_note_keeps_top() {
    let mut stack = NoteStack::new();

    stack.enqueue(48);
    stack.enqueue(52);
    stack.enqueue(55);

    assert_eq!(stack.dequeue(52), Some(55));
    assert_eq!(stack.len(), 2);
}

#[test]
fn reenqueued_note_moves_to_back() {
    let mut stack = NoteStack::new();

    stack.enqueue(48);
    stack.enqueue(52);
    stack.enqueue(48);

    assert_eq!(stack.top(), Some(48));
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.dequeue(48), Some(52));
}

#[test]
fn dequeue_of_unknown_note_is_harmless() {
    let mut stack = NoteStack::new();

    stack.enqueue(48);
    assert_eq!(stack.dequeue(60), Some(48));
    assert_eq!(stack.len(), 1);
}

#[test]
fn overflow_drops_oldest() {
    let mut stack = NoteStack::new();

    for n in 0..CAPACITY as u8 {
        stack.enqueue(n);
    }
    assert_eq!(stack.len(), CAPACITY);

    stack.enqueue(100);
    assert_eq!(stack.len(), CAPACITY);
    assert_eq!(stack.top(), Some(100));

    // Note 0 was dropped; removing it changes nothing.
    assert_eq!(stack.dequeue(0), Some(100));
    assert_eq!(stack.len(), CAPACITY);
}

#[test]
fn clear_empties_the_stack() {
    let mut stack = NoteStack::new();

    stack.enqueue(48);
    stack.enqueue(52);
    stack.clear();

    assert!(stack.is_empty());
    assert_eq!(stack.top(), None);
}
