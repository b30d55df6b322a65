//! Install and activate transitions over cache generations.
//!
//! Install fetches every core asset and writes them into the current
//! generation in one transaction, so a failed install leaves no trace and the
//! previous generation keeps serving. Activate deletes every other generation
//! and then claims clients. Interception starts only once the state is
//! [`LifecycleState::Active`].

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::Url;

use crate::fetch::Fetcher;
use mindful_core::{CacheDb, Error, Request, StoredResponse};

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Not yet installed.
    New,
    Installing,
    Installed,
    Activating,
    Active,
    /// The last install failed; install may be retried.
    Redundant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Status {
    state: LifecycleState,
    skip_waiting: bool,
    clients_claimed: bool,
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InstallReport {
    pub cache_name: String,
    /// Absolute URLs pre-cached, in core asset order.
    pub assets: Vec<String>,
}

/// Outcome of a successful activate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActivateReport {
    pub cache_name: String,
    /// Stale generations that were removed.
    pub deleted: Vec<String>,
}

/// Lifecycle manager for one deployed version.
#[derive(Debug)]
pub struct Lifecycle {
    cache_name: String,
    core_assets: Vec<Url>,
    status: RwLock<Status>,
}

impl Lifecycle {
    pub fn new(cache_name: impl Into<String>, core_assets: Vec<Url>) -> Self {
        Self {
            cache_name: cache_name.into(),
            core_assets,
            status: RwLock::new(Status { state: LifecycleState::New, skip_waiting: false, clients_claimed: false }),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub async fn state(&self) -> LifecycleState {
        self.status.read().await.state
    }

    pub async fn is_active(&self) -> bool {
        self.state().await == LifecycleState::Active
    }

    /// Whether install asked to take over without waiting for old clients.
    pub async fn skip_waiting(&self) -> bool {
        self.status.read().await.skip_waiting
    }

    pub async fn clients_claimed(&self) -> bool {
        self.status.read().await.clients_claimed
    }

    /// Pre-cache every core asset into the current generation.
    ///
    /// All-or-nothing: a transport failure or non-2xx status for any asset
    /// fails the install before anything is written.
    ///
    /// # Errors
    ///
    /// `Error::InstallFailed` for a bad asset, `Error::InvalidState` if an
    /// install or activation is already under way or done, or the store error.
    pub async fn install(&self, db: &CacheDb, fetcher: &dyn Fetcher) -> Result<InstallReport, Error> {
        self.transition(
            &[LifecycleState::New, LifecycleState::Redundant, LifecycleState::Installed],
            LifecycleState::Installing,
        )
        .await?;

        match self.precache(db, fetcher).await {
            Ok(report) => {
                let mut status = self.status.write().await;
                status.state = LifecycleState::Installed;
                status.skip_waiting = true;
                tracing::info!(cache = %self.cache_name, assets = report.assets.len(), "installed");
                Ok(report)
            }
            Err(err) => {
                self.status.write().await.state = LifecycleState::Redundant;
                tracing::warn!(cache = %self.cache_name, error = %err, "install failed");
                Err(err)
            }
        }
    }

    async fn precache(&self, db: &CacheDb, fetcher: &dyn Fetcher) -> Result<InstallReport, Error> {
        let mut entries: Vec<StoredResponse> = Vec::with_capacity(self.core_assets.len());

        for url in &self.core_assets {
            let request = Request::get(url.clone());
            let response = fetcher
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed { asset: url.to_string(), reason: e.to_string() })?;

            if !response.ok() {
                return Err(Error::InstallFailed { asset: url.to_string(), reason: format!("status {}", response.status) });
            }

            entries.push(response.snapshot(request.key(), &request.method));
        }

        let store = db.open_store(&self.cache_name).await?;
        store.put_all(entries).await?;

        Ok(InstallReport {
            cache_name: self.cache_name.clone(),
            assets: self.core_assets.iter().map(Url::to_string).collect(),
        })
    }

    /// Delete every generation except the current one, then claim clients.
    ///
    /// # Errors
    ///
    /// `Error::InvalidState` unless install has completed, or the store error
    /// (the state then returns to `Installed` so activation can be retried).
    pub async fn activate(&self, db: &CacheDb) -> Result<ActivateReport, Error> {
        self.transition(&[LifecycleState::Installed], LifecycleState::Activating).await?;

        match self.retire_stale(db).await {
            Ok(deleted) => {
                let mut status = self.status.write().await;
                status.clients_claimed = true;
                status.state = LifecycleState::Active;
                tracing::info!(cache = %self.cache_name, deleted = ?deleted, "activated and claimed clients");
                Ok(ActivateReport { cache_name: self.cache_name.clone(), deleted })
            }
            Err(err) => {
                self.status.write().await.state = LifecycleState::Installed;
                Err(err)
            }
        }
    }

    async fn retire_stale(&self, db: &CacheDb) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in db.store_names().await? {
            if name == self.cache_name {
                continue;
            }
            if db.delete_store(&name).await? {
                tracing::debug!(cache = %name, "deleted stale generation");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    async fn transition(&self, from: &[LifecycleState], to: LifecycleState) -> Result<(), Error> {
        let mut status = self.status.write().await;
        if !from.contains(&status.state) {
            return Err(Error::InvalidState(format!("cannot move from {:?} to {:?}", status.state, to)));
        }
        status.state = to;
        Ok(())
    }
}
