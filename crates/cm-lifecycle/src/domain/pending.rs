//! # Positional FIFO Matching
//!
//! Content-addressed ids collide when byte-identical content travels the same
//! network pair twice. Every instance therefore carries a `position_index`,
//! assigned from a per-id observation counter at creation time and never
//! reused. When an event must be matched to "the" in-flight instance of an
//! id, the engine resolves the **oldest** instance satisfying the event's
//! expected predecessor state, guaranteeing that colliding instances resolve
//! in send order.
//!
//! The caller must hold the serialization point for the id (the service's
//! store lock) across `next_position` and the subsequent insert; within one
//! network, events arrive in the network's native block order, which is what
//! makes send order equal observation order.

/// An instance carrying a per-id position index.
pub trait Positioned {
    /// Observation sequence number within this instance's id.
    fn position_index(&self) -> u64;
}

impl Positioned for super::entities::Message {
    fn position_index(&self) -> u64 {
        self.position_index
    }
}

impl Positioned for super::entities::Payload {
    fn position_index(&self) -> u64 {
        self.position_index
    }
}

/// Next position for a new instance of an id, given all existing instances.
/// Positions are never reused, so this is max + 1, not count.
pub fn next_position<T: Positioned>(existing: &[T]) -> u64 {
    existing
        .iter()
        .map(|t| t.position_index() + 1)
        .max()
        .unwrap_or(0)
}

/// Resolve the oldest instance satisfying `predicate`, by position index.
///
/// FIFO law: with colliding instances enqueued A then B, matching dequeues
/// always resolve A before B, and never an already-resolved instance (the
/// predicate excludes it by state).
pub fn oldest_matching<T: Positioned>(
    existing: &[T],
    predicate: impl Fn(&T) -> bool,
) -> Option<&T> {
    existing
        .iter()
        .filter(|t| predicate(t))
        .min_by_key(|t| t.position_index())
}
