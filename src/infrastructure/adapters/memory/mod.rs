//! In-memory adapter that records outbound activities

use async_trait::async_trait;
use std::sync::Mutex;
use crate::domain::entities::Activity;
use crate::domain::traits::ChannelAdapter;
use crate::application::errors::BotError;

/// Keeps every sent activity in memory; optionally fails every send
#[derive(Default)]
pub struct RecordingAdapter {
    sent: Mutex<Vec<Activity>>,
    failure: Option<String>,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    pub fn sent(&self) -> Vec<Activity> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|a| a.text)
            .collect()
    }
}

#[async_trait]
impl ChannelAdapter for RecordingAdapter {
    fn name(&self) -> &str {
        "memory"
    }

    async fn send_activity(&self, activity: &Activity) -> Result<String, BotError> {
        if let Some(reason) = &self.failure {
            return Err(BotError::Network(reason.clone()));
        }

        let mut sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.push(activity.clone());
        Ok(format!("memory-{}", sent.len()))
    }
}
