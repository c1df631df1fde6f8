#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ai_placeholder::{
    cache::ResultCache,
    clock::ManualClock,
    coordinator::GenerationCoordinator,
    error::GenerationError,
    generator::ImageGenerator,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// Generator whose calls block until the test releases them, then answer with
/// the configured outcome.
pub struct ScriptedGenerator {
    calls: AtomicUsize,
    gate: Semaphore,
    outcome: Mutex<Result<String, String>>,
    prompts: Mutex<Vec<(String, u32, u32)>>,
}

impl ScriptedGenerator {
    pub fn succeeding(url: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gate: Semaphore::new(0),
            outcome: Mutex::new(Ok(url.to_string())),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let generator = Self::succeeding("");
        *generator.outcome.lock() = Err(message.to_string());
        generator
    }

    pub fn set_outcome(&self, outcome: Result<&str, &str>) {
        *self.outcome.lock() = outcome.map(str::to_string).map_err(str::to_string);
    }

    pub fn release(&self, permits: usize) {
        self.gate.add_permits(permits);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<(String, u32, u32)> {
        self.prompts.lock().clone()
    }

    /// Yields to the runtime until `count` calls have started.
    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..10_000 {
            if self.calls() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {count} generator calls, saw {}", self.calls());
    }
}

#[async_trait]
impl ImageGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push((prompt.to_string(), width, height));
        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();
        let outcome = self.outcome.lock().clone();
        outcome.map_err(GenerationError::Remote)
    }
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub cache: Arc<ResultCache>,
    pub generator: Arc<ScriptedGenerator>,
    pub coordinator: GenerationCoordinator,
}

pub fn harness(generator: Arc<ScriptedGenerator>) -> Harness {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
    ));
    let cache = Arc::new(ResultCache::new(clock.clone()));
    let coordinator = GenerationCoordinator::new(cache.clone(), generator.clone(), clock.clone());
    Harness {
        clock,
        cache,
        generator,
        coordinator,
    }
}
