use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Job progress shared with the host.
///
/// The interrupt flag is polled between steps; whoever owns the other
/// end of the `Arc` (a Ctrl-C handler, a UI) can set it at any time.
#[derive(Debug, Clone)]
pub struct JobProgress {
    total: usize,
    done: usize,
    interrupt: Arc<AtomicBool>,
}

impl JobProgress {
    pub fn new(total: usize) -> Self {
        Self::with_interrupt(total, Arc::new(AtomicBool::new(false)))
    }

    pub fn with_interrupt(total: usize, interrupt: Arc<AtomicBool>) -> Self {
        Self {
            total,
            done: 0,
            interrupt,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn advance(&mut self) {
        self.done = (self.done + 1).min(self.total);
    }

    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        self.done as f32 / self.total as f32
    }

    pub fn is_finished(&self) -> bool {
        self.done == self.total
    }

    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_tracks_advance() {
        let mut p = JobProgress::new(4);
        assert_eq!(p.fraction(), 0.0);
        p.advance();
        p.advance();
        assert_eq!(p.fraction(), 0.5);
        p.advance();
        p.advance();
        assert!(p.is_finished());
        // advancing past the end saturates
        p.advance();
        assert_eq!(p.done(), 4);
    }

    #[test]
    fn empty_job_counts_as_finished() {
        let p = JobProgress::new(0);
        assert_eq!(p.fraction(), 1.0);
    }

    #[test]
    fn interrupt_is_visible_through_the_shared_flag() {
        let p = JobProgress::new(10);
        assert!(!p.interrupted());
        p.interrupt_flag().store(true, Ordering::Relaxed);
        assert!(p.interrupted());
    }
}
