// Interval fetcher - Use case for loading and extending metric windows
use crate::application::data_source::{DataSource, FetchError};
use crate::domain::interval::Interval;
use crate::domain::telemetry::{DataPoint, TimeFilter};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub type UpdateCallback = Arc<dyn Fn(&Interval) + Send + Sync>;

#[derive(Clone)]
pub struct IntervalFetcher {
    source: Arc<dyn DataSource>,
    on_update: Option<UpdateCallback>,
}

impl IntervalFetcher {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            on_update: None,
        }
    }

    /// Called with the interval after every successful fetch.
    pub fn with_on_update<F>(mut self, on_update: F) -> Self
    where
        F: Fn(&Interval) + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(on_update));
        self
    }

    /// Fetch all points in `[start, end]` into a new interval.
    pub async fn create(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Interval, FetchError> {
        let mut interval = Interval::new(id.into(), name.into(), start, end);
        self.populate(&mut interval).await?;
        Ok(interval)
    }

    async fn populate(&self, interval: &mut Interval) -> Result<(), FetchError> {
        if interval.start > interval.end {
            return Err(FetchError::InvalidWindow {
                start: interval.start,
                end: interval.end,
            });
        }
        let batch = self.fetch(interval, interval.initial_filter()).await?;
        interval.apply_initial(batch);
        self.notify(interval);
        Ok(())
    }

    /// Fetch points before the window, back to `start` or to the earliest
    /// available point. Returns the number of points added.
    pub async fn extend_left(
        &self,
        interval: &mut Interval,
        start: Option<DateTime<Utc>>,
    ) -> Result<usize, FetchError> {
        let batch = self.fetch(interval, interval.left_filter(start)).await?;
        let added = interval.apply_left(batch);
        self.notify(interval);
        Ok(added)
    }

    /// Fetch points after the window, up to `end` or to the latest available
    /// point. Returns the number of points added.
    pub async fn extend_right(
        &self,
        interval: &mut Interval,
        end: Option<DateTime<Utc>>,
    ) -> Result<usize, FetchError> {
        let batch = self.fetch(interval, interval.right_filter(end)).await?;
        let added = interval.apply_right(batch);
        self.notify(interval);
        Ok(added)
    }

    async fn fetch(&self, interval: &Interval, filter: TimeFilter) -> Result<Vec<DataPoint>, FetchError> {
        tracing::debug!(
            "Fetching {}/{} with filter {:?}",
            interval.id, interval.name, filter
        );
        self.source.fetch(&interval.id, &interval.name, filter).await
    }

    fn notify(&self, interval: &Interval) {
        if let Some(on_update) = &self.on_update {
            on_update(interval);
        }
    }

    /// Start loading an interval in the background and return a shared
    /// handle to it right away.
    ///
    /// Failures are logged and leave the interval unchanged. A reversed window
    /// is logged without sending a request. Extensions issued through the
    /// handle wait for the initial load.
    pub fn spawn_create(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> (IntervalHandle, JoinHandle<()>) {
        let interval = Arc::new(Mutex::new(Interval::new(id.into(), name.into(), start, end)));
        let handle = IntervalHandle {
            fetcher: self.clone(),
            interval: interval.clone(),
        };

        let fetcher = self.clone();
        let guard = interval.try_lock_owned();
        let task = tokio::spawn(async move {
            let mut guard = match guard {
                Ok(guard) => guard,
                Err(_) => return,
            };
            if let Err(e) = fetcher.populate(&mut guard).await {
                tracing::warn!("Loading {}/{} failed: {}", guard.id, guard.name, e);
            }
        });

        (handle, task)
    }
}

/// Shared interval updated by background fetch tasks.
///
/// Each extension is one independent task. Concurrent extensions of the same
/// handle may complete in either order; callers that need a fixed order must
/// await each task before issuing the next.
#[derive(Clone)]
pub struct IntervalHandle {
    fetcher: IntervalFetcher,
    interval: Arc<Mutex<Interval>>,
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl IntervalHandle {
    pub fn extend_left(&self, start: Option<DateTime<Utc>>) -> JoinHandle<()> {
        self.spawn_extend(Side::Left, start)
    }

    pub fn extend_right(&self, end: Option<DateTime<Utc>>) -> JoinHandle<()> {
        self.spawn_extend(Side::Right, end)
    }

    pub async fn snapshot(&self) -> Interval {
        self.interval.lock().await.clone()
    }

    fn spawn_extend(&self, side: Side, bound: Option<DateTime<Utc>>) -> JoinHandle<()> {
        let fetcher = self.fetcher.clone();
        let interval = self.interval.clone();

        tokio::spawn(async move {
            // the lock is released while the request is in flight
            let (id, name, filter) = {
                let current = interval.lock().await;
                let filter = match side {
                    Side::Left => current.left_filter(bound),
                    Side::Right => current.right_filter(bound),
                };
                (current.id.clone(), current.name.clone(), filter)
            };

            let batch = match fetcher.source.fetch(&id, &name, filter).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!("Extending {}/{} {:?} failed: {}", id, name, side, e);
                    return;
                }
            };

            let mut current = interval.lock().await;
            let added = match side {
                Side::Left => current.apply_left(batch),
                Side::Right => current.apply_right(batch),
            };
            tracing::debug!("Extended {}/{} {:?} by {} points", id, name, side, added);
            fetcher.notify(&current);
        })
    }
}
