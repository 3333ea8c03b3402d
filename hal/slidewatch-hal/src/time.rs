//! Time source abstraction

/// Monotonic millisecond clock
///
/// Used to bound every wait in the link layer. Implementations must never
/// go backwards; wrapping is not expected within a node's lifetime.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin (usually boot)
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `start`
    fn elapsed_since(&self, start: u64) -> u64 {
        self.now_ms().saturating_sub(start)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
