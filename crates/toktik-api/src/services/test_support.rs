//! In-memory fakes for service unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use toktik_core::models::{
    EncodeTask, ObjectKey, Operation, TaskInfo, User, VideoRecord, VideoWithOwner,
};
use toktik_db::MetadataStore;
use toktik_storage::{ByteStream, Storage, StorageBackend, StorageError, StorageResult};
use toktik_worker::EncodeQueue;
use uuid::Uuid;

enum Latency {
    None,
    Fixed(Duration),
    RandomUpTo(u64),
}

/// Object store kept in a map. Signing returns deterministic URLs.
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Bytes>>,
    latency: Latency,
    fail_suffix: Option<String>,
    sign_calls: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            latency: Latency::None,
            fail_suffix: None,
            sign_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_random_latency(mut self, max_millis: u64) -> Self {
        self.latency = Latency::RandomUpTo(max_millis);
        self
    }

    pub fn with_fixed_latency(mut self, latency: Duration) -> Self {
        self.latency = Latency::Fixed(latency);
        self
    }

    pub fn failing_for(mut self, suffix: &str) -> Self {
        self.fail_suffix = Some(suffix.to_string());
        self
    }

    pub fn insert(&self, key: &str, contents: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::from(contents.to_string()));
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn expected_url(key: &str, operation: Operation) -> String {
        format!("https://objects.test/{}?op={}", key, operation)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn signed_url(
        &self,
        key: &ObjectKey,
        operation: Operation,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        let delay = match self.latency {
            Latency::None => None,
            Latency::Fixed(delay) => Some(delay),
            Latency::RandomUpTo(max) => {
                Some(Duration::from_millis(rand::rng().random_range(0..=max)))
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(suffix) = &self.fail_suffix {
            if key.as_str().ends_with(suffix.as_str()) {
                return Err(StorageError::SigningFailed("access denied".to_string()));
            }
        }
        Ok(Self::expected_url(key.as_str(), operation))
    }

    async fn download_stream(&self, key: &ObjectKey) -> StorageResult<ByteStream> {
        let data = self
            .objects
            .lock()
            .unwrap()
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        // Small chunks so line boundaries fall inside and across chunks.
        let chunks: Vec<StorageResult<Bytes>> = data
            .chunks(7)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn upload(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn exists(&self, key: &ObjectKey) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key.as_str()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Metadata store with a fixed set of users.
#[derive(Default)]
pub struct FakeMetadataStore {
    users: Mutex<HashMap<String, User>>,
    videos: Mutex<Vec<VideoRecord>>,
    fail: bool,
}

impl FakeMetadataStore {
    pub fn with_user(username: &str) -> Self {
        let store = Self::default();
        store.users.lock().unwrap().insert(
            username.to_string(),
            User {
                id: Uuid::new_v4(),
                username: username.to_string(),
            },
        );
        store
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn video_count(&self) -> usize {
        self.videos.lock().unwrap().len()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }

    fn with_owner(&self, record: &VideoRecord) -> Option<VideoWithOwner> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|user| user.id == record.owner_id)
            .map(|user| VideoWithOwner::from_record(record.clone(), user.username.clone()))
    }
}

#[async_trait]
impl MetadataStore for FakeMetadataStore {
    async fn get_user_by_name(&self, username: &str) -> anyhow::Result<Option<User>> {
        self.check()?;
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn create_video(
        &self,
        display_name: &str,
        video_key: &str,
        owner_id: Uuid,
    ) -> anyhow::Result<VideoRecord> {
        self.check()?;
        let record = VideoRecord {
            id: Uuid::new_v4(),
            owner_id,
            display_name: display_name.to_string(),
            video_key: video_key.to_string(),
            view_count: 0,
            created_at: Utc::now(),
        };
        self.videos.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn get_user_video(
        &self,
        username: &str,
        video_key: &str,
    ) -> anyhow::Result<Option<VideoWithOwner>> {
        self.check()?;
        let videos = self.videos.lock().unwrap().clone();
        Ok(videos
            .iter()
            .filter(|record| record.video_key == video_key)
            .filter_map(|record| self.with_owner(record))
            .find(|video| video.username == username))
    }

    async fn increment_view_count(&self, video_id: Uuid) -> anyhow::Result<()> {
        self.check()?;
        if let Some(record) = self
            .videos
            .lock()
            .unwrap()
            .iter_mut()
            .find(|record| record.id == video_id)
        {
            record.view_count += 1;
        }
        Ok(())
    }

    async fn top_popular_videos(
        &self,
        _page: i64,
        _amount: i64,
    ) -> anyhow::Result<Vec<VideoWithOwner>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn video_by_rank(&self, _rank: i64) -> anyhow::Result<Option<VideoWithOwner>> {
        self.check()?;
        Ok(None)
    }

    async fn user_videos(&self, _username: &str) -> anyhow::Result<Vec<VideoWithOwner>> {
        self.check()?;
        Ok(Vec::new())
    }
}

/// Queue that records submissions, optionally rejecting all of them.
#[derive(Default)]
pub struct FakeQueue {
    submitted: Mutex<Vec<EncodeTask>>,
    fail: bool,
}

impl FakeQueue {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn submitted(&self) -> Vec<EncodeTask> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl EncodeQueue for FakeQueue {
    async fn enqueue(&self, task: EncodeTask) -> anyhow::Result<TaskInfo> {
        let task_type = task.task_type().to_string();
        self.submitted.lock().unwrap().push(task);
        if self.fail {
            anyhow::bail!("queue unavailable");
        }
        Ok(TaskInfo {
            id: Uuid::new_v4(),
            task_type,
            queued_at: Utc::now(),
        })
    }
}
