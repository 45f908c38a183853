//! # Outcome — Railway Composition over `Result`
//!
//! Every fallible step in medcred returns a plain `Result<T, E>`. The
//! standard library already provides `map`, `map_err` and `and_then`;
//! [`Outcome`] adds the remaining combinators the validation and service
//! pipelines are written in:
//!
//! | Combinator | Behaviour on `Ok(v)` | Behaviour on `Err(e)` |
//! |------------|----------------------|-----------------------|
//! | [`Outcome::ensure`] | `Err(error)` unless `predicate(&v)` | unchanged |
//! | [`Outcome::bind_if`] | `f(v)` if `predicate(&v)`, else `Ok(v)` | unchanged |
//! | [`Outcome::tap`] | observer sees `&v`, value unchanged | unchanged |
//! | [`Outcome::tap_error`] | unchanged | observer sees `&e`, value unchanged |
//! | [`Outcome::fold`] | `on_ok(v)` | `on_err(e)` |
//!
//! None of the closures run once the chain has become `Err`, so a pipeline
//! built from these operators short-circuits on the first failure.
//!
//! ## Fault Boundary
//!
//! [`try_wrap`] and [`try_wrap_async`] are the only places where faults from
//! foreign code enter the pipeline. Both the operation's own error and a
//! panic unwinding out of it are handed to the caller's error factory as a
//! [`Fault`], so nothing past the boundary ever sees a raw fault.

use std::any::Any;
use std::fmt;
use std::future::{self, Future};
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::task::Poll;

/// Railway-style combinators for `Result`.
pub trait Outcome<T, E>: Sized {
    /// Keep the success value only if `predicate` holds, otherwise fail
    /// with `error`. An existing failure passes through untouched.
    fn ensure(self, predicate: impl FnOnce(&T) -> bool, error: E) -> Result<T, E>;

    /// Like [`Outcome::ensure`], but builds the error from the rejected
    /// value only when the predicate fails.
    fn ensure_with(
        self,
        predicate: impl FnOnce(&T) -> bool,
        error: impl FnOnce(&T) -> E,
    ) -> Result<T, E>;

    /// Run the fallible step `f` only when `predicate` holds on the success
    /// value; otherwise pass the success through unchanged.
    fn bind_if(
        self,
        predicate: impl FnOnce(&T) -> bool,
        f: impl FnOnce(T) -> Result<T, E>,
    ) -> Result<T, E>;

    /// Observe the success value without changing the result.
    fn tap(self, observer: impl FnOnce(&T)) -> Result<T, E>;

    /// Observe the failure value without changing the result.
    fn tap_error(self, observer: impl FnOnce(&E)) -> Result<T, E>;

    /// Consume the result; exactly one branch runs.
    fn fold<R>(self, on_ok: impl FnOnce(T) -> R, on_err: impl FnOnce(E) -> R) -> R;
}

impl<T, E> Outcome<T, E> for Result<T, E> {
    fn ensure(self, predicate: impl FnOnce(&T) -> bool, error: E) -> Result<T, E> {
        match self {
            Ok(value) if predicate(&value) => Ok(value),
            Ok(_) => Err(error),
            Err(e) => Err(e),
        }
    }

    fn ensure_with(
        self,
        predicate: impl FnOnce(&T) -> bool,
        error: impl FnOnce(&T) -> E,
    ) -> Result<T, E> {
        match self {
            Ok(value) if predicate(&value) => Ok(value),
            Ok(value) => Err(error(&value)),
            Err(e) => Err(e),
        }
    }

    fn bind_if(
        self,
        predicate: impl FnOnce(&T) -> bool,
        f: impl FnOnce(T) -> Result<T, E>,
    ) -> Result<T, E> {
        match self {
            Ok(value) if predicate(&value) => f(value),
            other => other,
        }
    }

    fn tap(self, observer: impl FnOnce(&T)) -> Result<T, E> {
        if let Ok(value) = &self {
            observer(value);
        }
        self
    }

    fn tap_error(self, observer: impl FnOnce(&E)) -> Result<T, E> {
        if let Err(e) = &self {
            observer(e);
        }
        self
    }

    fn fold<R>(self, on_ok: impl FnOnce(T) -> R, on_err: impl FnOnce(E) -> R) -> R {
        match self {
            Ok(value) => on_ok(value),
            Err(e) => on_err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Fault boundary
// ---------------------------------------------------------------------------

/// A fault caught at the [`try_wrap`] boundary.
#[derive(Debug)]
pub enum Fault<X> {
    /// The wrapped operation returned an error.
    Error(X),
    /// The wrapped operation panicked; carries the panic message.
    Panicked(String),
}

impl<X: fmt::Display> fmt::Display for Fault<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(e) => write!(f, "{e}"),
            Self::Panicked(message) => write!(f, "operation panicked: {message}"),
        }
    }
}

impl<X: std::error::Error + 'static> std::error::Error for Fault<X> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Error(e) => Some(e),
            Self::Panicked(_) => None,
        }
    }
}

/// Run `operation`, converting its error or a panic into `E`.
pub fn try_wrap<T, X, E>(
    operation: impl FnOnce() -> Result<T, X>,
    error_factory: impl FnOnce(Fault<X>) -> E,
) -> Result<T, E> {
    match panic::catch_unwind(AssertUnwindSafe(operation)) {
        Ok(result) => result.map_err(|e| error_factory(Fault::Error(e))),
        Err(payload) => Err(error_factory(Fault::Panicked(panic_message(payload.as_ref())))),
    }
}

/// Asynchronous counterpart of [`try_wrap`].
///
/// Each poll of `operation` runs inside `catch_unwind`, so a panic raised
/// on any poll becomes `Fault::Panicked` instead of tearing down the task.
pub async fn try_wrap_async<T, X, E, F>(
    operation: F,
    error_factory: impl FnOnce(Fault<X>) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, X>>,
{
    let mut operation = pin!(operation);
    let result = future::poll_fn(|cx| {
        match panic::catch_unwind(AssertUnwindSafe(|| operation.as_mut().poll(cx))) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(result)) => Poll::Ready(result.map_err(Fault::Error)),
            Err(payload) => Poll::Ready(Err(Fault::Panicked(panic_message(payload.as_ref())))),
        }
    })
    .await;
    result.map_err(error_factory)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
