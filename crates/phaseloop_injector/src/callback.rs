//! Phase callbacks.
//!
//! A [`Callback`] is a shared, type-erased function with a label for
//! introspection. Clones share the same function; two callbacks are the
//! same callback iff one is a clone of the other (see [`Callback::same_as`]).

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Boxed error returned by a failing callback.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Return type of fallible callbacks and [`Injectable`](crate::Injectable) methods.
pub type CallbackResult = Result<(), BoxError>;

type CallbackFn = dyn Fn() -> CallbackResult + Send + Sync;

/// A function invoked when a phase is dispatched.
///
/// # Example
///
/// ```
/// use phaseloop_injector::Callback;
///
/// let tick = Callback::new(|| println!("tick")).named("tick");
/// let alias = tick.clone();
///
/// assert!(tick.same_as(&alias));
/// assert!(!tick.same_as(&Callback::new(|| println!("tick"))));
/// ```
#[derive(Clone)]
pub struct Callback {
    label: Cow<'static, str>,
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Wraps an infallible function.
    #[must_use]
    pub fn new<F>(func: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            label: Cow::Borrowed(core::any::type_name::<F>()),
            func: Arc::new(move || {
                func();
                Ok(())
            }),
        }
    }

    /// Wraps a function that may fail.
    #[must_use]
    pub fn fallible<F>(func: F) -> Self
    where
        F: Fn() -> CallbackResult + Send + Sync + 'static,
    {
        Self {
            label: Cow::Borrowed(core::any::type_name::<F>()),
            func: Arc::new(func),
        }
    }

    /// Replaces the label shown in introspection and error reports.
    #[must_use]
    pub fn named(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Returns the callback's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns true if `other` shares this callback's function.
    #[must_use]
    pub fn same_as(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }

    /// Invokes the callback directly.
    ///
    /// # Errors
    ///
    /// Returns whatever error the wrapped function returns.
    pub fn invoke(&self) -> CallbackResult {
        (self.func)()
    }

    /// Invokes the callback, converting failures into [`CallbackError`].
    ///
    /// With `isolate_panics`, a panic is caught and reported as
    /// [`CallbackError::Panicked`]; otherwise it unwinds into the caller.
    pub(crate) fn call(&self, isolate_panics: bool) -> Result<(), CallbackError> {
        let outcome = if isolate_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| (self.func)())) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    return Err(CallbackError::Panicked {
                        callback: self.label.to_string(),
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
        } else {
            (self.func)()
        };

        outcome.map_err(|source| CallbackError::Failed {
            callback: self.label.to_string(),
            source,
        })
    }
}

impl core::fmt::Debug for Callback {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Callback").field(&self.label).finish()
    }
}

fn panic_message(payload: &(dyn core::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A callback that failed during dispatch.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("callback '{callback}' failed: {source}")]
    Failed {
        /// Label of the failing callback.
        callback: String,
        /// The returned error.
        #[source]
        source: BoxError,
    },

    /// The callback panicked.
    #[error("callback '{callback}' panicked: {message}")]
    Panicked {
        /// Label of the panicking callback.
        callback: String,
        /// The panic message, if it was a string.
        message: String,
    },
}

impl CallbackError {
    /// Returns the label of the callback that failed.
    #[must_use]
    pub fn callback(&self) -> &str {
        match self {
            CallbackError::Failed { callback, .. } | CallbackError::Panicked { callback, .. } => {
                callback
            }
        }
    }
}
