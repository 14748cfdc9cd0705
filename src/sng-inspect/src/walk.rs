//! Bounded traversal
//!
//! Linked structures in the target are walked for an externally declared
//! number of steps. The chain itself is never trusted to terminate, so the
//! count is capped and the operator can abort between steps.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Abort flag shared between a traversal and whoever may interrupt it
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Interrupted)` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Interrupted);
        }
        Ok(())
    }
}

/// Take exactly `count` steps from `start`, collecting one item per step
///
/// `step` maps the current cursor to the next cursor and the step's item.
/// Counts above `limit` are rejected before the first step. Any step error
/// or cancellation discards everything collected so far.
pub fn bounded_walk<S, T, F>(
    start: S,
    count: usize,
    limit: usize,
    cancel: &Cancellation,
    mut step: F,
) -> Result<Vec<T>>
where
    F: FnMut(&S) -> Result<(S, T)>,
{
    if count > limit {
        return Err(Error::QueueLengthImplausible {
            length: count,
            limit,
        });
    }

    let mut items = Vec::with_capacity(count);
    let mut cursor = start;

    for _ in 0..count {
        cancel.check()?;
        let (next, item) = step(&cursor)?;
        items.push(item);
        cursor = next;
    }

    Ok(items)
}
