//! The payload shared by every state and transition of one machine.

use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;

/// Handle to a machine's shared payload.
///
/// Cloning the handle never clones the payload: all clones point at the
/// same object for the lifetime of the machine. Hooks lock it for as long
/// as they need it and must not hold the guard across a call back into
/// the machine.
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Lock the payload.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the payload.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Whether two handles refer to the same payload object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Shared<T> {
    /// Copy the payload out.
    pub fn snapshot(&self) -> T {
        self.inner.lock().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&*self.inner.lock()).finish()
    }
}
