use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::cache::{GenerationRecord, GenerationStatus, ResultCache, fingerprint};
use crate::clock::Clock;
use crate::generator::ImageGenerator;

pub const COMPLETED_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const FAILED_TTL: Duration = Duration::from_secs(5 * 60);
pub const STALE_AFTER: Duration = Duration::from_secs(60 * 60);

#[derive(Default)]
struct CoordinatorState {
    records: HashMap<String, GenerationRecord>,
    queue: VecDeque<String>,
    worker_running: bool,
}

struct Inner {
    state: Mutex<CoordinatorState>,
    idle: Notify,
    cache: Arc<ResultCache>,
    generator: Arc<dyn ImageGenerator>,
    clock: Arc<dyn Clock>,
}

/// Queues image generations and runs them one at a time on a background task.
///
/// Requests are keyed by fingerprint, so repeated or concurrent requests for the
/// same image share a single record and a single outbound call. Finished records
/// move into the [`ResultCache`].
#[derive(Clone)]
pub struct GenerationCoordinator {
    inner: Arc<Inner>,
}

impl GenerationCoordinator {
    pub fn new(
        cache: Arc<ResultCache>,
        generator: Arc<dyn ImageGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CoordinatorState::default()),
                idle: Notify::new(),
                cache,
                generator,
                clock,
            }),
        }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.inner.cache
    }

    /// Returns the image id right away; generation, if needed, happens in the
    /// background. Must be called from within a tokio runtime.
    pub fn request_generation(&self, width: u32, height: u32, text: &str) -> String {
        let id = fingerprint(width, height, text);
        let spawn_worker = {
            // checked under the state lock: the worker caches before untracking
            let mut state = self.inner.state.lock();
            if state.records.contains_key(&id) || self.inner.cache.has(&id) {
                return id;
            }
            let record = GenerationRecord::new(
                id.clone(),
                width,
                height,
                text.to_string(),
                self.inner.clock.now(),
            );
            state.records.insert(id.clone(), record);
            state.queue.push_back(id.clone());
            tracing::info!(%id, width, height, "queued image generation");
            !std::mem::replace(&mut state.worker_running, true)
        };

        if spawn_worker {
            tokio::spawn(self.clone().drain_queue());
        }
        id
    }

    pub fn get_status(&self, id: &str) -> Option<GenerationRecord> {
        if let Some(record) = self.inner.state.lock().records.get(id) {
            return Some(record.clone());
        }
        self.inner.cache.get(id)
    }

    /// Resolves once the background worker has drained the queue.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.inner.state.lock().worker_running {
                return;
            }
            notified.await;
        }
    }

    pub fn is_processing(&self) -> bool {
        self.inner.state.lock().worker_running
    }

    pub fn tracked_len(&self) -> usize {
        self.inner.state.lock().records.len()
    }

    pub fn queued_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Drops tracked records created more than [`STALE_AFTER`] ago, whatever
    /// their status.
    pub fn cleanup_stale(&self) -> usize {
        let now = self.inner.clock.now();
        let mut state = self.inner.state.lock();
        let before = state.records.len();
        state
            .records
            .retain(|_, record| match (now - record.created_at).to_std() {
                Ok(age) => age <= STALE_AFTER,
                Err(_) => true,
            });
        before - state.records.len()
    }

    pub fn spawn_cleanup(&self, every: Duration) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = coordinator.cleanup_stale();
                if removed > 0 {
                    tracing::info!(removed, "discarded stale generation records");
                }
            }
        })
    }

    async fn drain_queue(self) {
        loop {
            let next = {
                let mut state = self.inner.state.lock();
                match state.queue.pop_front() {
                    Some(id) => id,
                    None => {
                        state.worker_running = false;
                        break;
                    }
                }
            };
            self.process(&next).await;
        }
        self.inner.idle.notify_waiters();
    }

    async fn process(&self, id: &str) {
        let mut record = {
            let mut state = self.inner.state.lock();
            let Some(record) = state.records.get_mut(id) else {
                tracing::debug!(%id, "skipping discarded generation record");
                return;
            };
            record.mark_generating();
            record.clone()
        };

        tracing::info!(
            %id,
            text = %record.text,
            width = record.width,
            height = record.height,
            "generating image"
        );
        let result = self
            .inner
            .generator
            .generate(&record.text, record.width, record.height)
            .await;

        let now = self.inner.clock.now();
        let ttl = match result {
            Ok(image_url) => {
                tracing::info!(%id, %image_url, "image generation completed");
                record.complete(image_url, now);
                COMPLETED_TTL
            }
            Err(err) => {
                tracing::error!(%id, error = %err, "image generation failed");
                record.fail(err.to_string(), now);
                FAILED_TTL
            }
        };

        self.inner.cache.set(id, record, ttl);

        let mut state = self.inner.state.lock();
        if state
            .records
            .get(id)
            .is_some_and(|tracked| tracked.status == GenerationStatus::Generating)
        {
            state.records.remove(id);
        }
    }
}
