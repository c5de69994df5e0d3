//! Round-robin load balancing strategy.

use crate::load_balancer::backend::BackendEntry;

/// Round-robin selector.
/// Stores the cursor used to rotate through backends.
///
/// The cursor is plain state; callers keep it under the same lock as the
/// entries it scans.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position the next scan starts from.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Return the index of the next healthy entry, or `None` if there is none.
    ///
    /// The cursor advances one slot per candidate inspected, healthy or not.
    /// A scan that finds nothing advances exactly `len` slots and therefore
    /// ends where it started.
    pub fn next_index(&mut self, backends: &[BackendEntry]) -> Option<usize> {
        let len = backends.len();
        if len == 0 {
            return None;
        }
        // Registry only grows, but keep the cursor in range regardless.
        self.cursor %= len;

        for _ in 0..len {
            let index = self.cursor;
            self.cursor = (self.cursor + 1) % len;
            if backends[index].healthy {
                return Some(index);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::backend::BackendDescriptor;

    fn entries(flags: &[bool]) -> Vec<BackendEntry> {
        flags
            .iter()
            .enumerate()
            .map(|(i, &healthy)| BackendEntry {
                descriptor: BackendDescriptor::new("127.0.0.1", 8080 + i as u16),
                healthy,
            })
            .collect()
    }

    #[test]
    fn test_round_robin() {
        let mut lb = RoundRobin::new();
        let backends = entries(&[true, true]);

        assert_eq!(lb.next_index(&backends), Some(0));
        assert_eq!(lb.next_index(&backends), Some(1));
        assert_eq!(lb.next_index(&backends), Some(0));
    }

    #[test]
    fn skips_unhealthy_and_resumes_after_pick() {
        let mut lb = RoundRobin::new();
        let backends = entries(&[false, true, true]);

        assert_eq!(lb.next_index(&backends), Some(1));
        assert_eq!(lb.cursor(), 2);
        assert_eq!(lb.next_index(&backends), Some(2));
        assert_eq!(lb.next_index(&backends), Some(1));
    }

    #[test]
    fn all_unhealthy_leaves_cursor_in_place() {
        let mut lb = RoundRobin::new();
        let healthy = entries(&[true, true, true]);
        lb.next_index(&healthy);
        assert_eq!(lb.cursor(), 1);

        let down = entries(&[false, false, false]);
        assert_eq!(lb.next_index(&down), None);
        assert_eq!(lb.cursor(), 1);
        assert_eq!(lb.next_index(&down), None);
        assert_eq!(lb.cursor(), 1);
    }

    #[test]
    fn empty_returns_none() {
        let mut lb = RoundRobin::new();
        assert_eq!(lb.next_index(&[]), None);
        assert_eq!(lb.cursor(), 0);
    }

    #[test]
    fn single_backend_repeats() {
        let mut lb = RoundRobin::new();
        let backends = entries(&[true]);
        assert_eq!(lb.next_index(&backends), Some(0));
        assert_eq!(lb.next_index(&backends), Some(0));
    }
}
