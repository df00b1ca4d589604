//! Shared worklist of metrics still to export.

use std::sync::Arc;

use parking_lot::Mutex;

use histwatch_types::MetricName;

/// A LIFO stack of metric names shared by all export lanes.
///
/// Cloning yields another handle onto the same stack. The lock is held only
/// for the duration of a push or pop, never across an await point.
#[derive(Debug, Clone, Default)]
pub struct Worklist {
    inner: Arc<Mutex<Vec<MetricName>>>,
}

impl Worklist {
    pub fn new(metrics: impl IntoIterator<Item = MetricName>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(metrics.into_iter().collect())),
        }
    }

    /// Take the next metric, or `None` once the list is drained.
    pub fn pop(&self) -> Option<MetricName> {
        self.inner.lock().pop()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
