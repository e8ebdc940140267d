//! core::lazy
//!
//! Deferred, memoized values.
//!
//! A [`Deferred`] holds a computation that does not run until the value is
//! first observed. The result is memoized, and every clone of the deferred
//! shares the same memo cell, so a fact is computed at most once per build.
//!
//! # Example
//!
//! ```
//! use gitfacts::core::lazy::Deferred;
//!
//! let answer = Deferred::new(|| 40 + 2);
//! let doubled = answer.map(|n| n * 2);
//!
//! // Composing does not force the source
//! assert!(!answer.is_evaluated());
//!
//! assert_eq!(*doubled.get(), 84);
//! assert!(answer.is_evaluated());
//! ```

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

type Thunk<T> = Box<dyn FnOnce() -> T + Send>;

/// A value that is computed on first access and memoized thereafter.
pub struct Deferred<T> {
    cell: Arc<Lazy<T, Thunk<T>>>,
}

impl<T> Deferred<T> {
    /// Create a deferred value. `compute` runs at most once, on the first
    /// call to [`Deferred::get`] on this value or any of its clones.
    pub fn new<F>(compute: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            cell: Arc::new(Lazy::new(Box::new(compute) as Thunk<T>)),
        }
    }

    /// Force the computation if needed and borrow the result.
    pub fn get(&self) -> &T {
        Lazy::force(&self.cell)
    }

    /// Whether the value has already been computed.
    pub fn is_evaluated(&self) -> bool {
        Lazy::get(&self.cell).is_some()
    }
}

impl<T> Deferred<T>
where
    T: Send + Sync + 'static,
{
    /// Derive a new deferred value from this one.
    ///
    /// Neither `self` nor the result is evaluated until the result is
    /// observed. Forcing the result forces `self` first.
    pub fn map<U, F>(&self, transform: F) -> Deferred<U>
    where
        F: FnOnce(&T) -> U + Send + 'static,
    {
        let source = self.clone();
        Deferred::new(move || transform(source.get()))
    }
}

impl<T: Clone> Deferred<T> {
    /// Force the computation and clone the result out.
    pub fn value(&self) -> T {
        self.get().clone()
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Lazy::get(&self.cell) {
            Some(value) => f.debug_tuple("Deferred").field(value).finish(),
            None => f.write_str("Deferred(<pending>)"),
        }
    }
}
