/// Per slot load of a [`Link`].
///
/// This is a gauge bounded by the link's capacity: every packet crossing
/// the link during the current slot reserves one unit. Once the gauge is
/// full the link is saturated and every subsequent reservation fails
/// until the gauge is [`reset`] at the start of the next slot.
///
/// The load never exceeds the capacity: reservations are refused rather
/// than clamped.
///
/// [`Link`]: super::Link
/// [`reset`]: LinkLoad::reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkLoad {
    capacity: u64,
    used: u64,
}

impl LinkLoad {
    /// create an empty gauge for a link of the given capacity.
    ///
    /// ```
    /// # use trafficsim_core::link::LinkLoad;
    /// let load = LinkLoad::with_capacity(80);
    /// # assert_eq!(load.capacity(), 80);
    /// assert_eq!(load.used(), 0);
    /// ```
    pub fn with_capacity(capacity: u64) -> Self {
        Self { capacity, used: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// number of packets that crossed the link during the current slot
    #[inline]
    pub fn used(&self) -> u64 {
        self.used
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.capacity.saturating_sub(self.used)
    }

    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.used >= self.capacity
    }

    /// attempt to let one more packet through the link.
    ///
    /// Returns `false`, leaving the gauge untouched, if the link is
    /// already saturated.
    ///
    /// ```
    /// # use trafficsim_core::link::LinkLoad;
    /// let mut load = LinkLoad::with_capacity(1);
    /// assert!(load.reserve());
    /// assert!(!load.reserve());
    /// assert_eq!(load.used(), 1);
    /// ```
    pub fn reserve(&mut self) -> bool {
        if self.is_saturated() {
            false
        } else {
            self.used += 1;
            true
        }
    }

    /// release all the reserved capacity for the upcoming slot
    #[inline]
    pub fn reset(&mut self) {
        self.used = 0;
    }
}
