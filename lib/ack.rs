use core::sync::atomic::{AtomicBool, Ordering};

/// Operator acknowledgement button.
pub trait AckInput {
    /// Unmask the edge interrupt. Edges seen while masked are discarded.
    fn enable_edge_interrupt(&mut self);
    fn disable_edge_interrupt(&mut self);
}

/// Latched button press. Set only by the edge interrupt, cleared only by the
/// measurement loop.
pub struct AckLatch(AtomicBool);

impl AckLatch {
    pub const fn new() -> Self {
        AckLatch(AtomicBool::new(false))
    }

    /// Called from the edge interrupt, which masks itself right after.
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Consume a pending acknowledgement.
    ///
    /// Load then store instead of a swap: the interrupt is masked once it has
    /// fired, so nothing can set the latch between the two.
    pub fn take(&self) -> bool {
        if self.is_set() {
            self.0.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }
}

/// Whether a pending-edge register value holds an edge for the line in
/// `mask`. Several lines can share one interrupt vector.
pub fn line_pending(pending: u32, mask: u32) -> bool {
    pending & mask != 0
}
