//! In-memory vendor API
//!
//! Stores objects in a map keyed by generated IDs and applies updates with
//! the same sparse-merge semantics as the real API. Failures can be queued
//! to exercise retry and error paths.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::debug;
use spotform_core::{Merge, Payload};
use tokio::sync::Mutex;

use super::{ApiError, ApiResult, ResourceApi};
use crate::resources::update_policy::RollPolicy;

/// A call received by [`InMemoryApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Create,
    Read(String),
    Update(String),
    Delete(String),
    Roll { id: String, policy: RollPolicy },
}

pub struct InMemoryApi<P> {
    id_prefix: &'static str,
    account: Option<String>,
    next_id: AtomicU64,
    objects: Mutex<BTreeMap<String, P>>,
    failures: Mutex<VecDeque<ApiError>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl<P> InMemoryApi<P>
where
    P: Payload + Merge + Clone + 'static,
{
    /// IDs are generated as `{id_prefix}-{counter}`
    pub fn new(id_prefix: &'static str) -> Self {
        Self {
            id_prefix,
            account: None,
            next_id: AtomicU64::new(1),
            objects: Mutex::new(BTreeMap::new()),
            failures: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_account(mut self, account: Option<String>) -> Self {
        self.account = account;
        self
    }

    /// Make the next call fail with `error`; queued failures are consumed in order
    pub async fn fail_next(&self, error: ApiError) {
        self.failures.lock().await.push_back(error);
    }

    /// Every call received so far, including failed ones
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<P> {
        self.objects.lock().await.get(id).cloned()
    }

    /// Change a stored object out of band, as another client would
    pub async fn modify(&self, id: &str, change: impl FnOnce(&mut P)) -> bool {
        match self.objects.lock().await.get_mut(id) {
            Some(object) => {
                change(object);
                true
            }
            None => false,
        }
    }

    /// Delete a stored object out of band
    pub async fn remove(&self, id: &str) -> Option<P> {
        self.objects.lock().await.remove(id)
    }

    async fn record(&self, call: ApiCall) -> ApiResult<()> {
        debug!(
            "in-memory API ({}): {:?}",
            self.account.as_deref().unwrap_or("default account"),
            call
        );
        self.calls.lock().await.push(call);
        match self.failures.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn generate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{}-{:08x}", self.id_prefix, n)
    }
}

#[async_trait]
impl<P> ResourceApi<P> for InMemoryApi<P>
where
    P: Payload + Merge + Clone + 'static,
{
    async fn create(&self, payload: &P) -> ApiResult<P> {
        self.record(ApiCall::Create).await?;

        let id = self.generate_id();
        let mut stored = P::with_identity(&id);
        stored.merge(payload.clone());
        self.objects.lock().await.insert(id, stored.clone());
        Ok(stored)
    }

    async fn read(&self, id: &str) -> ApiResult<Option<P>> {
        self.record(ApiCall::Read(id.to_string())).await?;
        Ok(self.objects.lock().await.get(id).cloned())
    }

    async fn update(&self, payload: &P) -> ApiResult<P> {
        let id = payload
            .identity()
            .ok_or_else(|| ApiError::status("BAD_REQUEST", "update payload has no ID"))?
            .to_string();
        self.record(ApiCall::Update(id.clone())).await?;

        let mut objects = self.objects.lock().await;
        let stored = objects
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(id.clone()))?;
        stored.merge(payload.clone());
        Ok(stored.clone())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.record(ApiCall::Delete(id.to_string())).await?;
        self.objects
            .lock()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    async fn roll(&self, id: &str, policy: &RollPolicy) -> ApiResult<()> {
        self.record(ApiCall::Roll {
            id: id.to_string(),
            policy: policy.clone(),
        })
        .await?;
        if self.objects.lock().await.contains_key(id) {
            Ok(())
        } else {
            Err(ApiError::NotFound(id.to_string()))
        }
    }

    fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }
}
