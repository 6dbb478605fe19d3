//! Debug-only probe reentrancy check.
//!
//! Probing calls into user code (`K: Hash` and `K: Eq`). If that code
//! reaches back into the same map while a probe is running it could observe
//! a table that is halfway through a rebuild. Debug builds turn that into a
//! panic; release builds compile the check away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map probe tracker. Each probing entry point holds the returned
/// [`ProbeScope`] for as long as user code may run.
#[derive(Debug)]
pub(crate) struct ProbeCheck {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // Cell already makes this !Sync; the marker keeps release builds the same.
    _not_sync: PhantomData<Cell<()>>,
}

impl ProbeCheck {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _not_sync: PhantomData,
        }
    }

    /// Mark a probe as running. Panics in debug builds if one already is.
    #[inline]
    pub(crate) fn enter(&self) -> ProbeScope<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.replace(true),
                "reentrancy detected: map accessed from inside Hash or Eq"
            );
            return ProbeScope { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return ProbeScope { _lt: PhantomData };
        }
    }
}

/// RAII marker returned by [`ProbeCheck::enter`]; clears the flag on drop.
pub(crate) struct ProbeScope<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ProbeCheck,
    #[cfg(not(debug_assertions))]
    _lt: PhantomData<&'a ()>,
}

impl Drop for ProbeScope<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(false);
    }
}
