#![allow(dead_code)]

pub mod mock_service;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

use droplink::common::DropConfig;
use droplink::download::SaveSink;

/// Config pointed at a loopback mock service.
pub fn test_config(base_url: &str) -> DropConfig {
    DropConfig {
        service_url: base_url.to_string(),
        ..Default::default()
    }
}

/// Save sink that records calls instead of touching the filesystem.
#[derive(Default)]
pub struct RecordingSink {
    saves: Mutex<Vec<(String, usize)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> Vec<(String, usize)> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl SaveSink for RecordingSink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
        self.saves
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.len()));
        Ok(PathBuf::from(filename))
    }
}

/// Save sink that always fails, for error-path coverage.
pub struct FailingSink;

#[async_trait]
impl SaveSink for FailingSink {
    async fn save(&self, _filename: &str, _bytes: &[u8]) -> anyhow::Result<PathBuf> {
        anyhow::bail!("no space left on device")
    }
}
