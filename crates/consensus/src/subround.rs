//! Subround descriptor.

use crate::SubroundId;
use std::time::Duration;

/// Static description of a subround: where it sits inside the round window
/// and how many job-done bits finish it.
#[derive(Debug, Clone)]
pub struct Subround {
    /// Which subround this is.
    pub id: SubroundId,
    /// Offset of the subround's start within the round.
    pub start_offset: Duration,
    /// Offset of the subround's end within the round.
    pub end_offset: Duration,
    /// Minimum number of group members whose job must be done for the
    /// subround to finish.
    pub threshold: usize,
}

impl Subround {
    /// Create a descriptor. `end_offset` must not precede `start_offset`.
    pub fn new(
        id: SubroundId,
        start_offset: Duration,
        end_offset: Duration,
        threshold: usize,
    ) -> Self {
        assert!(
            end_offset >= start_offset,
            "subround window must not be inverted"
        );
        Subround {
            id,
            start_offset,
            end_offset,
            threshold,
        }
    }

    /// Length of the subround window.
    pub fn duration(&self) -> Duration {
        self.end_offset - self.start_offset
    }

    /// Name for logs.
    pub fn name(&self) -> &'static str {
        self.id.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let sr = Subround::new(
            SubroundId::Block,
            Duration::from_millis(200),
            Duration::from_millis(1000),
            1,
        );
        assert_eq!(sr.duration(), Duration::from_millis(800));
        assert_eq!(sr.name(), "block");
    }

    #[test]
    #[should_panic]
    fn test_inverted_window_rejected() {
        let _ = Subround::new(
            SubroundId::Block,
            Duration::from_millis(1000),
            Duration::from_millis(200),
            1,
        );
    }
}
