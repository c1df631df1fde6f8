use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Generating,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One requested image. `image_url` is set only once completed, `error` only once
/// failed, and `completed_at` only in either terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRecord {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub text: String,
    pub status: GenerationStatus,
    pub image_url: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GenerationRecord {
    pub fn new(id: String, width: u32, height: u32, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            width,
            height,
            text,
            status: GenerationStatus::Pending,
            image_url: None,
            error: None,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn mark_generating(&mut self) {
        if self.status == GenerationStatus::Pending {
            self.status = GenerationStatus::Generating;
        }
    }

    pub fn complete(&mut self, image_url: String, now: DateTime<Utc>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = GenerationStatus::Completed;
        self.image_url = Some(image_url);
        self.error = None;
        self.completed_at = Some(now);
    }

    pub fn fail(&mut self, message: String, now: DateTime<Utc>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = GenerationStatus::Failed;
        self.error = Some(message);
        self.image_url = None;
        self.completed_at = Some(now);
    }

    /// Milliseconds between enqueue and the terminal transition.
    pub fn processing_time_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|completed| (completed - self.created_at).num_milliseconds())
    }
}
