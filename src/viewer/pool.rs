//! Object pool for DOM label nodes.
//!
//! Creating and destroying text divs on every transition churns the DOM;
//! releasing them back here keeps detached nodes around for reuse. The
//! caller owns creation so fallible constructors (DOM APIs) stay out of
//! the pool itself.

use std::collections::VecDeque;

#[derive(Debug)]
pub struct Pool<T> {
    idle: VecDeque<T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            idle: VecDeque::new(),
        }
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take an idle object if one is available.
    pub fn acquire(&mut self) -> Option<T> {
        self.idle.pop_front()
    }

    pub fn release(&mut self, object: T) {
        self.idle.push_back(object);
    }

    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_release_order_then_runs_dry() {
        let mut pool = Pool::new();
        pool.release("a");
        pool.release("b");
        assert_eq!(pool.idle_len(), 2);
        assert_eq!(pool.acquire(), Some("a"));
        assert_eq!(pool.acquire(), Some("b"));
        assert_eq!(pool.acquire(), None);
    }
}
