//! In-memory `FarmApi` and cache fixtures shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use farmmate_core::api::{CreateThreadRequest, FarmApi, ModifyThreadRequest, ThreadCreated};
use farmmate_core::bookmark::{Bookmark, NewBookmark};
use farmmate_core::chat::{RawMessage, SentReply, ThreadHistory};
use farmmate_core::crop::{CropEntry, CropSummary, ThreadListing};
use farmmate_core::guidance::Guidance;
use farmmate_core::pest::{PestAlerts, PestDetail};
use farmmate_core::weather::{CurrentWeather, DayForecast};
use farmmate_core::{FarmmateError, Result};
use farmmate_infrastructure::LocalCache;
use serde_json::Value;
use tempfile::TempDir;

pub(crate) struct MockState {
    pub member_id: String,
    pub crops: Vec<CropSummary>,
    pub threads: ThreadListing,
    pub histories: HashMap<String, Vec<RawMessage>>,
    pub bookmarks: HashMap<String, Vec<Bookmark>>,
    pub next_thread_id: Option<String>,
    pub next_bookmark_id: Option<String>,
    pub reply: Option<String>,
    pub weather: Option<CurrentWeather>,
    pub forecast: Vec<DayForecast>,
    pub alerts: PestAlerts,
    pub guidance: Guidance,
    pub failing: HashSet<&'static str>,
    pub calls: Vec<&'static str>,
    pub created_threads: Vec<CreateThreadRequest>,
    pub modified_threads: Vec<(String, ModifyThreadRequest)>,
    pub sent_bookmarks: Vec<NewBookmark>,
}

/// Backend fake. Operations listed in `failing` answer with HTTP 500.
pub(crate) struct MockFarmApi {
    pub state: Mutex<MockState>,
}

impl MockFarmApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                member_id: "M1".into(),
                crops: vec![
                    CropSummary {
                        crop_id: 1,
                        crop_name: "감자".into(),
                    },
                    CropSummary {
                        crop_id: 2,
                        crop_name: "고구마".into(),
                    },
                ],
                threads: ThreadListing::default(),
                histories: HashMap::new(),
                bookmarks: HashMap::new(),
                next_thread_id: Some("T1".into()),
                next_bookmark_id: Some("B9".into()),
                reply: Some("answer".into()),
                weather: None,
                forecast: Vec::new(),
                alerts: PestAlerts::default(),
                guidance: Guidance::default(),
                failing: HashSet::new(),
                calls: Vec::new(),
                created_threads: Vec::new(),
                modified_threads: Vec::new(),
                sent_bookmarks: Vec::new(),
            }),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn fail(&self, operation: &'static str) {
        self.state().failing.insert(operation);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == operation).count()
    }

    pub fn total_calls(&self) -> usize {
        self.state().calls.len()
    }

    fn call(&self, operation: &'static str) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        state.calls.push(operation);
        if state.failing.contains(operation) {
            return Err(FarmmateError::http(500, format!("{operation} failed"), false));
        }
        Ok(state)
    }
}

#[async_trait]
impl FarmApi for MockFarmApi {
    async fn create_member(&self) -> Result<String> {
        Ok(self.call("create_member")?.member_id.clone())
    }

    async fn list_crops(&self) -> Result<Vec<CropSummary>> {
        Ok(self.call("list_crops")?.crops.clone())
    }

    async fn list_threads(&self, _member_id: &str) -> Result<ThreadListing> {
        Ok(self.call("list_threads")?.threads.clone())
    }

    async fn create_thread(
        &self,
        _member_id: &str,
        request: &CreateThreadRequest,
    ) -> Result<ThreadCreated> {
        let mut state = self.call("create_thread")?;
        state.created_threads.push(request.clone());
        let thread_id = state.next_thread_id.clone();
        if let Some(id) = &thread_id {
            state
                .threads
                .0
                .insert(request.crop_name.clone(), Value::String(id.clone()));
        }
        Ok(ThreadCreated { thread_id })
    }

    async fn modify_thread(
        &self,
        _member_id: &str,
        thread_id: &str,
        request: &ModifyThreadRequest,
    ) -> Result<ThreadCreated> {
        let mut state = self.call("modify_thread")?;
        state
            .modified_threads
            .push((thread_id.to_string(), request.clone()));
        Ok(ThreadCreated::default())
    }

    async fn delete_thread(&self, _member_id: &str, thread_id: &str) -> Result<()> {
        let mut state = self.call("delete_thread")?;
        state.threads.0.retain(|_, v| v.as_str() != Some(thread_id));
        Ok(())
    }

    async fn get_thread_history(
        &self,
        _member_id: &str,
        thread_id: &str,
    ) -> Result<ThreadHistory> {
        let state = self.call("get_thread_history")?;
        let messages = state
            .histories
            .get(thread_id)
            .cloned()
            .ok_or_else(|| FarmmateError::http(404, "thread not found", false))?;
        Ok(ThreadHistory { messages })
    }

    async fn send_message(
        &self,
        _member_id: &str,
        thread_id: &str,
        message: &str,
    ) -> Result<SentReply> {
        let mut state = self.call("send_message")?;
        let reply = state.reply.clone();
        let history = state.histories.entry(thread_id.to_string()).or_default();
        history.push(RawMessage::new(Some("USER"), message));
        if let Some(reply) = &reply {
            history.push(RawMessage::new(Some("ASSISTANT"), reply));
        }
        Ok(SentReply { message: reply })
    }

    async fn list_bookmarks(&self, _member_id: &str, thread_id: &str) -> Result<Vec<Bookmark>> {
        let state = self.call("list_bookmarks")?;
        Ok(state.bookmarks.get(thread_id).cloned().unwrap_or_default())
    }

    async fn create_bookmark(
        &self,
        _member_id: &str,
        thread_id: &str,
        bookmark: &NewBookmark,
    ) -> Result<String> {
        let mut state = self.call("create_bookmark")?;
        state.sent_bookmarks.push(bookmark.clone());
        let bookmark_id = state
            .next_bookmark_id
            .clone()
            .ok_or_else(|| FarmmateError::data_format("bookmark response carries no bookmarkId"))?;
        state
            .bookmarks
            .entry(thread_id.to_string())
            .or_default()
            .push(Bookmark {
                bookmark_id: bookmark_id.clone(),
                question: bookmark.question.clone(),
                answer: bookmark.answer.clone(),
                chatted_at: Some(bookmark.chatted_at.clone()),
            });
        Ok(bookmark_id)
    }

    async fn delete_bookmark(
        &self,
        _member_id: &str,
        thread_id: &str,
        bookmark_id: &str,
    ) -> Result<()> {
        let mut state = self.call("delete_bookmark")?;
        let list = state.bookmarks.entry(thread_id.to_string()).or_default();
        let before = list.len();
        list.retain(|b| b.bookmark_id != bookmark_id);
        if list.len() == before {
            return Err(FarmmateError::http(404, "bookmark not found", false));
        }
        Ok(())
    }

    async fn current_weather(&self, _address: &str) -> Result<CurrentWeather> {
        self.call("current_weather")?
            .weather
            .clone()
            .ok_or_else(|| FarmmateError::network("weather service unreachable"))
    }

    async fn short_term_forecast(&self, _address: &str) -> Result<Vec<DayForecast>> {
        Ok(self.call("short_term_forecast")?.forecast.clone())
    }

    async fn pest_alerts(&self, _crop_name: &str) -> Result<PestAlerts> {
        Ok(self.call("pest_alerts")?.alerts.clone())
    }

    async fn pest_detail(&self, pest_name: &str, crop_name: &str) -> Result<PestDetail> {
        self.call("pest_detail")?;
        Ok(PestDetail {
            sick_name_kor: pest_name.to_string(),
            crop_name: crop_name.to_string(),
            ..PestDetail::default()
        })
    }

    async fn guidance(
        &self,
        _member_id: &str,
        _thread_id: &str,
        _crop_id: i64,
    ) -> Result<Guidance> {
        Ok(self.call("guidance")?.guidance.clone())
    }
}

/// A cache with member `M1`, `감자` linked to thread `T1` at `평창` and
/// `고구마` not created yet.
pub(crate) fn seeded_cache(temp_dir: &TempDir) -> Arc<LocalCache> {
    let cache = LocalCache::open(temp_dir.path().join("local_storage.json")).unwrap();
    cache
        .update(|doc| {
            doc.member_id = Some("M1".into());
            let mut potato = CropEntry::new(1);
            potato.attach_thread("T1");
            potato.address = "평창".into();
            doc.crops_data.insert("감자", potato);
            doc.crops_data.insert("고구마", CropEntry::new(2));
            Ok(())
        })
        .unwrap();
    Arc::new(cache)
}

pub(crate) fn empty_cache(temp_dir: &TempDir) -> Arc<LocalCache> {
    Arc::new(LocalCache::open(temp_dir.path().join("local_storage.json")).unwrap())
}

pub(crate) fn bookmark(id: &str, question: &str, answer: &str) -> Bookmark {
    Bookmark {
        bookmark_id: id.into(),
        question: question.into(),
        answer: answer.into(),
        chatted_at: None,
    }
}
