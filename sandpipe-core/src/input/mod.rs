//! Input bridge for sandpipe-core.
//!
//! Responsibilities:
//! - Buffer raw input occurrences pushed by the host's delivery thread
//!   ([`EventQueue`]) until the application's next pump.
//! - Drain, translate, and forward them in exact arrival order
//!   ([`pump_events`]); the code tables live in [`keys`].
//!
//! Notes / constraints:
//! - The queue is deliberately unbounded with no back-pressure: a host that
//!   outpaces the pump grows memory rather than dropping or blocking. The
//!   consumer is a per-frame poll, so there is no condition variable either;
//!   `pop` returns `None` instead of waiting.
//! - Events carry host-native codes. Translation happens at pump time, on the
//!   application thread, keeping the push path cheap for the host.

pub mod keys;

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::driver::{ButtonState, EventSink};

/// One host-delivered input occurrence, exactly as the host reported it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RawEvent {
    MouseButtonDown { button: i32, x: i32, y: i32 },
    MouseButtonUp { button: i32, x: i32, y: i32 },
    MouseMove { x: i32, y: i32 },
    KeyDown { code: u32 },
    KeyUp { code: u32 },
}

/// Thread-safe FIFO of raw input events.
///
/// Producer: the host delivery thread, via [`EventQueue::push`]. Consumer:
/// the application thread, via [`EventQueue::pop`] (usually through
/// [`pump_events`]). Insertion order is delivery order and is preserved
/// exactly.
#[derive(Default)]
pub struct EventQueue {
    queue: Mutex<VecDeque<RawEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event. O(1), callable from any thread.
    pub fn push(&self, event: RawEvent) {
        self.queue.lock().push_back(event);
    }

    /// Remove and return the oldest event, or `None` when the queue is
    /// empty. O(1), never blocks beyond the queue lock itself.
    pub fn pop(&self) -> Option<RawEvent> {
        self.queue.lock().pop_front()
    }
}

/// Drain `queue` completely, translating each raw event and forwarding it to
/// `sink` in the exact order popped. Loops until empty, not just one event;
/// events pushed concurrently while draining are picked up too.
pub fn pump_events(queue: &EventQueue, sink: &mut dyn EventSink) {
    use keys::{translate_button, translate_key};

    while let Some(event) = queue.pop() {
        match event {
            RawEvent::MouseButtonDown { button, x, y } => {
                sink.mouse_button(ButtonState::Pressed, translate_button(button), x, y);
            }
            RawEvent::MouseButtonUp { button, x, y } => {
                sink.mouse_button(ButtonState::Released, translate_button(button), x, y);
            }
            RawEvent::MouseMove { x, y } => sink.mouse_motion(x, y),
            RawEvent::KeyDown { code } => sink.keyboard(ButtonState::Pressed, translate_key(code)),
            RawEvent::KeyUp { code } => sink.keyboard(ButtonState::Released, translate_key(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Key, MouseButton};

    /// Sink that records everything it receives, in order.
    #[derive(Default)]
    struct RecordingSink {
        log: Vec<String>,
    }

    impl EventSink for RecordingSink {
        fn mouse_button(&mut self, state: ButtonState, button: MouseButton, x: i32, y: i32) {
            self.log.push(format!("button {state:?} {button:?} {x},{y}"));
        }

        fn mouse_motion(&mut self, x: i32, y: i32) {
            self.log.push(format!("motion {x},{y}"));
        }

        fn keyboard(&mut self, state: ButtonState, key: Key) {
            self.log.push(format!("key {state:?} {key:?}"));
        }
    }

    #[test]
    fn pop_on_empty_returns_none() {
        let queue = EventQueue::new();
        assert_eq!(queue.pop(), None);
        // Still none after a push/pop cycle.
        queue.push(RawEvent::KeyDown { code: 65 });
        assert!(queue.pop().is_some());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn fifo_order_is_preserved() {
        let queue = EventQueue::new();
        let events = [
            RawEvent::KeyDown { code: 65 },
            RawEvent::MouseMove { x: 3, y: 4 },
            RawEvent::MouseButtonDown { button: 0, x: 3, y: 4 },
            RawEvent::MouseButtonUp { button: 0, x: 3, y: 4 },
            RawEvent::KeyUp { code: 65 },
        ];
        for e in events {
            queue.push(e);
        }
        for e in events {
            assert_eq!(queue.pop(), Some(e));
        }
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn concurrent_pushes_are_neither_lost_nor_reordered() {
        use std::sync::Arc;

        let queue = Arc::new(EventQueue::new());
        let producer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                for code in 0..1_000u32 {
                    queue.push(RawEvent::KeyDown { code });
                }
            })
        };

        // Consume concurrently until all 1000 events have been seen.
        let mut seen = Vec::with_capacity(1_000);
        while seen.len() < 1_000 {
            if let Some(RawEvent::KeyDown { code }) = queue.pop() {
                seen.push(code);
            }
        }
        producer.join().unwrap();

        // Single producer, so pop order must equal push order exactly.
        let expected: Vec<u32> = (0..1_000).collect();
        assert_eq!(seen, expected);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn pump_drains_completely_and_in_order() {
        let queue = EventQueue::new();
        queue.push(RawEvent::KeyDown { code: 65 });
        queue.push(RawEvent::MouseButtonDown { button: 2, x: 10, y: 20 });
        queue.push(RawEvent::MouseMove { x: 11, y: 21 });
        queue.push(RawEvent::MouseButtonUp { button: 2, x: 11, y: 21 });
        queue.push(RawEvent::KeyUp { code: 65 });

        let mut sink = RecordingSink::default();
        pump_events(&queue, &mut sink);

        assert_eq!(
            sink.log,
            vec![
                "key Pressed A",
                "button Pressed Right 10,20",
                "motion 11,21",
                "button Released Right 11,21",
                "key Released A",
            ]
        );
        assert_eq!(queue.pop(), None, "pump must leave the queue empty");
    }

    #[test]
    fn pump_forwards_unknown_codes_instead_of_dropping() {
        let queue = EventQueue::new();
        queue.push(RawEvent::KeyDown { code: 250 });
        queue.push(RawEvent::MouseButtonDown { button: 7, x: 0, y: 0 });

        let mut sink = RecordingSink::default();
        pump_events(&queue, &mut sink);

        assert_eq!(
            sink.log,
            vec!["key Pressed Unknown", "button Pressed Unknown 0,0"]
        );
    }
}
