//! Line batching for the write buffer.
//!
//! A batch is released when it reaches `max_lines`, or by the owner once
//! `max_age` has passed since the last release.

use std::time::{Duration, Instant};

pub struct BatchBuffer {
    lines: Vec<String>,
    max_lines: usize,
    max_age: Duration,
    last_release: Instant,
}

impl BatchBuffer {
    pub fn new(max_lines: usize, max_age: Duration) -> Self {
        let max_lines = max_lines.max(1);
        Self {
            lines: Vec::with_capacity(max_lines.min(4096)),
            max_lines,
            max_age,
            last_release: Instant::now(),
        }
    }

    /// Append a line; returns the full batch once `max_lines` is reached.
    pub fn push(&mut self, line: String) -> Option<Vec<String>> {
        self.lines.push(line);
        (self.lines.len() >= self.max_lines).then(|| self.take())
    }

    /// True when lines are waiting and the batch is older than `max_age`.
    pub fn is_due(&self) -> bool {
        !self.lines.is_empty() && self.last_release.elapsed() >= self.max_age
    }

    /// Release whatever is buffered and restart the age clock.
    pub fn take(&mut self) -> Vec<String> {
        self.last_release = Instant::now();
        std::mem::take(&mut self.lines)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_lines_until_full() {
        let mut buf = BatchBuffer::new(3, Duration::from_secs(60));
        assert!(buf.push("a".into()).is_none());
        assert!(buf.push("b".into()).is_none());
        assert_eq!(buf.len(), 2);

        let batch = buf.push("c".into()).expect("third line fills the batch");
        assert_eq!(batch, vec!["a", "b", "c"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn age_only_matters_when_non_empty() {
        let mut buf = BatchBuffer::new(100, Duration::ZERO);
        assert!(!buf.is_due());

        buf.push("a".into());
        assert!(buf.is_due());
        assert_eq!(buf.take(), vec!["a"]);
        assert!(!buf.is_due());
    }

    #[test]
    fn zero_batch_size_is_treated_as_one() {
        let mut buf = BatchBuffer::new(0, Duration::from_secs(60));
        assert_eq!(buf.push("a".into()), Some(vec!["a".to_string()]));
    }
}
