//! Synchronization primitives for handing state to an interrupt handler.
//!
//! The receive ring itself is never locked. These cells exist only so the
//! producer handle, created in `main`, can be parked in a `static` and picked
//! up by the capture interrupt.

use core::cell::RefCell;
use critical_section::Mutex;

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for safe mutable access
/// from both normal code and interrupt handlers.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }
}

// SAFETY: CriticalSectionCell uses critical sections to protect all access.
unsafe impl<T: Send> Sync for CriticalSectionCell<T> {}

/// Slot for a value installed once and then used from an interrupt handler.
///
/// ```ignore
/// static RX_IRQ: IsrCell<RxProducer<'static, Capture, Counters<Timer>, 4>> = IsrCell::new();
///
/// RX_IRQ.install(producer);
///
/// #[interrupt]
/// fn PIO0_IRQ_0() {
///     RX_IRQ.with(|producer| producer.on_interrupt());
/// }
/// ```
pub struct IsrCell<T> {
    cell: CriticalSectionCell<Option<T>>,
}

impl<T> Default for IsrCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IsrCell<T> {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self {
            cell: CriticalSectionCell::new(None),
        }
    }

    /// Store `value`, returning whatever was installed before.
    pub fn install(&self, value: T) -> Option<T> {
        self.cell.with(|slot| slot.replace(value))
    }

    /// Remove the installed value.
    pub fn take(&self) -> Option<T> {
        self.cell.with(Option::take)
    }

    /// Run `f` on the installed value, if any.
    ///
    /// Returns `None` before [`install`](Self::install) or when re-entered.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.cell.try_with(|slot| slot.as_mut().map(f)).flatten()
    }

    /// Whether a value is installed.
    pub fn is_installed(&self) -> bool {
        self.cell.with(|slot| slot.is_some())
    }
}
