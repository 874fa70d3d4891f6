//! Scripted in-memory storage client for unit tests.

use std::{
    collections::{BTreeMap, HashMap, HashSet, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    models::{
        container::{AccountStats, ContainerStats, ContainerSummary},
        object::{ObjectPage, ObjectRecord},
    },
    services::client::{ClientError, Connector, StorageClient},
};

/// A canned response served before the real listing logic.
pub enum Scripted {
    Page(Vec<&'static str>),
    Fail(ClientError),
}

#[derive(Default)]
struct State {
    account: AccountStats,
    containers: BTreeMap<String, ContainerStats>,
    objects: HashMap<String, BTreeMap<String, ObjectRecord>>,
    scripted: Mutex<VecDeque<Scripted>>,
    failing_prefixes: HashSet<String>,
    failing_stats: HashSet<String>,
    cancel_on_call: Option<(usize, CancellationToken)>,
    list_calls: AtomicUsize,
    sessions: AtomicUsize,
}

/// Storage client over plain maps. Cloning shares the same state, so a clone
/// handed out by [`Connector::connect`] sees the same objects.
#[derive(Clone, Default)]
pub struct MemoryClient {
    state: Arc<State>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_mut(&mut self) -> &mut State {
        Arc::get_mut(&mut self.state).expect("configure MemoryClient before cloning")
    }

    pub fn with_account(mut self, bytes_used: i64) -> Self {
        self.state_mut().account = AccountStats {
            container_count: 1,
            object_count: i64::from(bytes_used > 0),
            bytes_used,
        };
        self
    }

    pub fn with_account_stats(mut self, stats: AccountStats) -> Self {
        self.state_mut().account = stats;
        self
    }

    /// Add a container whose reported stats are given explicitly.
    pub fn with_container(mut self, name: &str, object_count: i64, bytes_used: i64) -> Self {
        let state = self.state_mut();
        state.containers.insert(
            name.to_string(),
            ContainerStats {
                name: name.to_string(),
                object_count,
                bytes_used,
                last_modified: None,
                versions_location: None,
            },
        );
        state.objects.entry(name.to_string()).or_default();
        self
    }

    pub fn with_versions_location(mut self, name: &str, location: &str) -> Self {
        if let Some(stats) = self.state_mut().containers.get_mut(name) {
            stats.versions_location = Some(location.to_string());
        }
        self
    }

    pub fn with_objects(mut self, container: &str, objects: &[(&str, u64)]) -> Self {
        let listing = self
            .state_mut()
            .objects
            .entry(container.to_string())
            .or_default();
        for (name, bytes) in objects {
            listing.insert(name.to_string(), ObjectRecord::new(*name, *bytes));
        }
        self
    }

    /// Add `count` objects named `obj-00000`, `obj-00001`, ... of `bytes` each.
    pub fn with_numbered_objects(mut self, container: &str, count: usize, bytes: u64) -> Self {
        let listing = self
            .state_mut()
            .objects
            .entry(container.to_string())
            .or_default();
        for i in 0..count {
            let name = format!("obj-{:05}", i);
            listing.insert(name.clone(), ObjectRecord::new(name, bytes));
        }
        self
    }

    pub fn with_script(mut self, responses: Vec<Scripted>) -> Self {
        self.state_mut().scripted = Mutex::new(responses.into());
        self
    }

    pub fn with_failing_prefix(mut self, prefix: &str) -> Self {
        self.state_mut().failing_prefixes.insert(prefix.to_string());
        self
    }

    /// Make `head_container` fail for `name` while it still shows up in
    /// `list_containers`.
    pub fn with_failing_stat(mut self, name: &str) -> Self {
        self.state_mut().failing_stats.insert(name.to_string());
        self
    }

    /// Cancel `token` when the `call`-th listing request (1-based) arrives.
    pub fn cancel_on_list_call(mut self, call: usize, token: CancellationToken) -> Self {
        self.state_mut().cancel_on_call = Some((call, token));
        self
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> usize {
        self.state.sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageClient for MemoryClient {
    async fn head_account(&self) -> Result<AccountStats, ClientError> {
        Ok(self.state.account.clone())
    }

    async fn head_container(&self, container: &str) -> Result<ContainerStats, ClientError> {
        if self.state.failing_stats.contains(container) {
            return Err(ClientError::Other(format!("stat of `{}` rejected", container)));
        }
        self.state
            .containers
            .get(container)
            .cloned()
            .ok_or_else(|| ClientError::ContainerNotFound(container.to_string()))
    }

    async fn list_objects(
        &self,
        container: &str,
        cursor: Option<&str>,
        limit: usize,
        prefix: Option<&str>,
    ) -> Result<ObjectPage, ClientError> {
        let call = self.state.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((at, token)) = &self.state.cancel_on_call {
            if *at == call {
                token.cancel();
            }
        }

        let scripted = self.state.scripted.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted::Fail(err)) => return Err(err),
            Some(Scripted::Page(names)) => {
                return Ok(ObjectPage::new(
                    names.into_iter().map(|n| ObjectRecord::new(n, 1)).collect(),
                ));
            }
            None => {}
        }

        if let Some(p) = prefix {
            if self.state.failing_prefixes.contains(p) {
                return Err(ClientError::transient(format!("prefix `{}` timed out", p)));
            }
        }

        let listing = self
            .state
            .objects
            .get(container)
            .ok_or_else(|| ClientError::ContainerNotFound(container.to_string()))?;
        let objects = listing
            .values()
            .filter(|obj| cursor.is_none_or(|c| obj.name.as_str() > c))
            .filter(|obj| prefix.is_none_or(|p| obj.name.starts_with(p)))
            .take(limit)
            .cloned()
            .collect();
        Ok(ObjectPage::new(objects))
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ClientError> {
        Ok(self
            .state
            .containers
            .values()
            .map(|c| ContainerSummary {
                name: c.name.clone(),
                object_count: c.object_count,
                bytes_used: c.bytes_used,
            })
            .collect())
    }
}

#[async_trait]
impl Connector for MemoryClient {
    async fn connect(&self) -> Result<Box<dyn StorageClient>, ClientError> {
        self.state.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}
