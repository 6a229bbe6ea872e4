use std::future::Future;
use futures::stream::{self, StreamExt, TryStreamExt};
use crate::error::Result;

/// Runs fallible tasks with a concurrency limit, all-or-nothing
pub struct ParallelProcessor {
    max_concurrent: usize,
}

impl ParallelProcessor {
    /// Creates a processor running at most `max_concurrent` tasks at once
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Concurrency limit in effect
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Maps every item through `f` and collects the results in input order
    ///
    /// The first error is returned as soon as it is produced; tasks still in
    /// flight are dropped and the remaining items are never started.
    pub async fn try_process_ordered<I, F, Fut, T>(&self, items: I, f: F) -> Result<Vec<T>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        stream::iter(items)
            .map(f)
            .buffered(self.max_concurrent)
            .try_collect()
            .await
    }
}
