//! In-memory metadata store and queue standing in for PostgreSQL.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use toktik_core::models::{EncodeTask, TaskInfo, User, VideoRecord, VideoWithOwner};
use toktik_db::MetadataStore;
use toktik_worker::EncodeQueue;
use uuid::Uuid;

#[derive(Default)]
pub struct FakeMetadataStore {
    users: Mutex<HashMap<String, User>>,
    videos: Mutex<Vec<VideoRecord>>,
    fail: AtomicBool,
}

impl FakeMetadataStore {
    pub fn add_user(&self, username: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
        };
        self.users
            .lock()
            .unwrap()
            .insert(username.to_string(), user.clone());
        user
    }

    /// Insert a video directly, `age_secs` in the past.
    pub fn add_video(&self, username: &str, video_key: &str, views: i64, age_secs: i64) {
        let owner = self
            .users
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .unwrap_or_else(|| panic!("unknown user {}", username));
        self.videos.lock().unwrap().push(VideoRecord {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            display_name: format!("{} clip", video_key),
            video_key: video_key.to_string(),
            view_count: views,
            created_at: Utc::now() - Duration::seconds(age_secs),
        });
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn videos(&self) -> Vec<VideoRecord> {
        self.videos.lock().unwrap().clone()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("metadata store unavailable");
        }
        Ok(())
    }

    fn joined(&self) -> Vec<VideoWithOwner> {
        let users = self.users.lock().unwrap();
        self.videos
            .lock()
            .unwrap()
            .iter()
            .filter_map(|record| {
                users
                    .values()
                    .find(|user| user.id == record.owner_id)
                    .map(|user| VideoWithOwner::from_record(record.clone(), user.username.clone()))
            })
            .collect()
    }

    fn by_popularity(&self) -> Vec<VideoWithOwner> {
        let mut videos = self.joined();
        videos.sort_by(|a, b| {
            b.view_count
                .cmp(&a.view_count)
                .then(b.created_at.cmp(&a.created_at))
        });
        videos
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
        Ok(self
            .joined()
            .into_iter()
            .find(|video| video.username == username && video.video_key == video_key))
    }

    async fn increment_view_count(&self, video_id: Uuid) -> anyhow::Result<()> {
        self.check()?;
        let mut videos = self.videos.lock().unwrap();
        if let Some(record) = videos.iter_mut().find(|record| record.id == video_id) {
            record.view_count += 1;
        }
        Ok(())
    }

    async fn top_popular_videos(
        &self,
        page: i64,
        amount: i64,
    ) -> anyhow::Result<Vec<VideoWithOwner>> {
        self.check()?;
        Ok(self
            .by_popularity()
            .into_iter()
            .skip((page * amount) as usize)
            .take(amount as usize)
            .collect())
    }

    async fn video_by_rank(&self, rank: i64) -> anyhow::Result<Option<VideoWithOwner>> {
        self.check()?;
        Ok(self.by_popularity().into_iter().nth((rank - 1) as usize))
    }

    async fn user_videos(&self, username: &str) -> anyhow::Result<Vec<VideoWithOwner>> {
        self.check()?;
        Ok(self
            .joined()
            .into_iter()
            .filter(|video| video.username == username)
            .collect())
    }
}

#[derive(Default)]
pub struct FakeQueue {
    submitted: Mutex<Vec<EncodeTask>>,
    fail: AtomicBool,
}

impl FakeQueue {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every enqueue attempt, including rejected ones.
    pub fn submitted(&self) -> Vec<EncodeTask> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl EncodeQueue for FakeQueue {
    async fn enqueue(&self, task: EncodeTask) -> anyhow::Result<TaskInfo> {
        let task_type = task.task_type().to_string();
        self.submitted.lock().unwrap().push(task);
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("queue unavailable");
        }
        Ok(TaskInfo {
            id: Uuid::new_v4(),
            task_type,
            queued_at: Utc::now(),
        })
    }
}
