//! Guard predicates and behaviour hooks attached to the model.
//!
//! Guards are pure boolean functions over the trigger that decide whether a
//! transition is eligible. Behaviours are the side-effect hooks run on state
//! entry, state exit, and transition traversal.

use crate::engine::Transaction;
use std::fmt;

/// Pure predicate over a trigger that decides whether a transition may fire.
///
/// # Example
///
/// ```rust
/// use statechart::core::Guard;
///
/// let is_go = Guard::new(|event: &&str| *event == "go");
///
/// assert!(is_go.check(&"go"));
/// assert!(!is_go.check(&"stop"));
/// ```
pub struct Guard<T> {
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Guard<T> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and free of side effects; the
    /// engine may evaluate it any number of times during one dispatch.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Check whether the guard accepts this trigger.
    pub fn check(&self, trigger: &T) -> bool {
        (self.predicate)(trigger)
    }

    /// Evaluate against an optional trigger; with no trigger there is
    /// nothing to test, so the guard never passes.
    pub(crate) fn accepts(&self, trigger: Option<&T>) -> bool {
        trigger.is_some_and(|t| self.check(t))
    }
}

impl<T> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard")
    }
}

/// Side-effect hook invoked with the live transaction and the trigger.
///
/// The trigger is `None` while a machine is being initialised.
pub struct Behavior<T> {
    action: Box<dyn Fn(&dyn Transaction, Option<&T>) + Send + Sync>,
}

impl<T> Behavior<T> {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&dyn Transaction, Option<&T>) + Send + Sync + 'static,
    {
        Behavior {
            action: Box::new(action),
        }
    }

    pub fn run(&self, transaction: &dyn Transaction, trigger: Option<&T>) {
        (self.action)(transaction, trigger)
    }
}

impl<T> fmt::Debug for Behavior<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Behavior")
    }
}
