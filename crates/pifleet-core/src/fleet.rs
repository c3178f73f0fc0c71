// ── Fleet coordinator ──
//
// Applies one operation across some or all instances and reports one
// `ActionStatus` per instance. Instance failures stay isolated: fan-out
// uses `join_all`, and every error path becomes a status value.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use pifleet_api::StatsSummary;
use secrecy::ExposeSecret;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{FleetConfig, SyncMode};
use crate::error::CoreError;
use crate::model::{
    ActionStatus, Instance, InstanceEdit, InstanceStatus, NewInstance, UNKNOWN_INSTANCE,
    describe_seconds,
};
use crate::session::{SessionManager, check_error};
use crate::store::{self, InstanceStore};

/// Shown when restart is refused because the instance is not active.
pub const UNREACHABLE_MESSAGE: &str =
    "Instance is unreachable. Check the instance status and your API key.";

// ── Fleet ────────────────────────────────────────────────────────

/// Handle to a fleet of appliances backed by an [`InstanceStore`].
///
/// Cheaply cloneable via `Arc<FleetInner>`. Constructed explicitly and
/// passed to whoever needs it.
pub struct Fleet<S> {
    inner: Arc<FleetInner<S>>,
}

impl<S> Clone for Fleet<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct FleetInner<S> {
    config: FleetConfig,
    store: S,
    sessions: SessionManager,
    /// Serializes read-modify-write cycles on the store.
    write_lock: Mutex<()>,
}

impl<S: InstanceStore> Fleet<S> {
    /// Build a fleet handle with one pooled HTTP client for all instances.
    pub fn new(store: S, config: FleetConfig) -> Result<Self, CoreError> {
        let http = config.transport().build_client()?;
        Ok(Self::with_http_client(store, config, http))
    }

    /// Build a fleet handle on top of an existing `reqwest::Client`.
    pub fn with_http_client(store: S, config: FleetConfig, http: reqwest::Client) -> Self {
        let sessions = SessionManager::new(http, config.session_check_timeout);
        Self {
            inner: Arc::new(FleetInner {
                config,
                store,
                sessions,
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &FleetConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub(crate) fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Every stored instance, in stored order.
    pub async fn instances(&self) -> Result<Vec<Instance>, CoreError> {
        self.inner.store.load().await
    }

    pub async fn instance(&self, id: u32) -> Result<Instance, CoreError> {
        self.instances()
            .await?
            .into_iter()
            .find(|i| i.id == id)
            .ok_or(CoreError::InstanceNotFound { id })
    }

    /// The reference instance, if any.
    pub async fn reference(&self) -> Result<Option<Instance>, CoreError> {
        Ok(self.instances().await?.into_iter().find(|i| i.is_reference))
    }

    // ── Sessions & status ────────────────────────────────────────

    /// Revalidate one instance and persist the result if it changed.
    pub async fn ensure_authenticated_instance(
        &self,
        instance: &Instance,
    ) -> Result<Instance, CoreError> {
        let resolved = self.inner.sessions.revalidate(instance).await;
        if resolved != *instance {
            self.persist_session_state(std::slice::from_ref(&resolved))
                .await?;
        }
        Ok(resolved)
    }

    /// Make sure instance `id` has a live session; returns its status.
    pub async fn ensure_authenticated(&self, id: u32) -> Result<InstanceStatus, CoreError> {
        let instance = self.instance(id).await?;
        Ok(self.ensure_authenticated_instance(&instance).await?.status)
    }

    /// Refresh one instance's status.
    pub async fn refresh_status(&self, id: u32) -> Result<Instance, CoreError> {
        let instance = self.instance(id).await?;
        self.ensure_authenticated_instance(&instance).await
    }

    /// Refresh every instance concurrently, then write once if anything
    /// changed.
    pub async fn refresh_all(&self) -> Result<Vec<Instance>, CoreError> {
        let instances = self.instances().await?;
        let sessions = &self.inner.sessions;
        let resolved: Vec<Instance> =
            join_all(instances.iter().map(|i| sessions.revalidate(i))).await;

        if resolved == instances {
            debug!(count = resolved.len(), "no status changes");
        } else {
            self.persist_session_state(&resolved).await?;
        }
        Ok(resolved)
    }

    /// Merge session fields and statuses onto the latest stored collection.
    /// Saves only when the serialized collection changed; returns whether
    /// it did.
    pub(crate) async fn persist_session_state(
        &self,
        updates: &[Instance],
    ) -> Result<bool, CoreError> {
        let _guard = self.inner.write_lock.lock().await;
        let mut latest = self.inner.store.load().await?;
        let before = fingerprint(&latest)?;
        store::merge_session_state(&mut latest, updates);
        if fingerprint(&latest)? == before {
            return Ok(false);
        }
        self.inner.store.save(&latest).await?;
        debug!(count = updates.len(), "persisted session state");
        Ok(true)
    }

    // ── Actions ──────────────────────────────────────────────────

    /// Disable blocking on one instance for `seconds`.
    pub async fn pause(&self, id: u32, seconds: u64) -> ActionStatus {
        self.run(id, FleetAction::Pause { seconds }).await
    }

    pub async fn resume(&self, id: u32) -> ActionStatus {
        self.run(id, FleetAction::Resume).await
    }

    /// Restart the resolver. Refused without a network call unless the
    /// instance resolves to `active`.
    pub async fn restart(&self, id: u32) -> ActionStatus {
        self.run(id, FleetAction::Restart).await
    }

    pub async fn rebuild_gravity(&self, id: u32) -> ActionStatus {
        self.run(id, FleetAction::Gravity).await
    }

    pub async fn pause_all(&self, seconds: u64) -> Vec<ActionStatus> {
        self.run_all(FleetAction::Pause { seconds }).await
    }

    pub async fn resume_all(&self) -> Vec<ActionStatus> {
        self.run_all(FleetAction::Resume).await
    }

    pub async fn restart_all(&self) -> Vec<ActionStatus> {
        self.run_all(FleetAction::Restart).await
    }

    pub async fn rebuild_gravity_all(&self) -> Vec<ActionStatus> {
        self.run_all(FleetAction::Gravity).await
    }

    async fn run(&self, id: u32, action: FleetAction) -> ActionStatus {
        match self.instance(id).await {
            Ok(instance) => self.perform(instance, action).await,
            Err(e) => {
                warn!(id, error = %e, "cannot run {action:?}");
                ActionStatus::failure(
                    UNKNOWN_INSTANCE,
                    format!("{}: {e}", action.failure_message()),
                    None,
                )
            }
        }
    }

    async fn run_all(&self, action: FleetAction) -> Vec<ActionStatus> {
        let instances = match self.instances().await {
            Ok(instances) => instances,
            Err(e) => {
                warn!(error = %e, "cannot load instances for {action:?}");
                return vec![ActionStatus::failure(
                    UNKNOWN_INSTANCE,
                    format!("{}: {e}", action.failure_message()),
                    None,
                )];
            }
        };
        join_all(instances.into_iter().map(|i| self.perform(i, action))).await
    }

    async fn perform(&self, instance: Instance, action: FleetAction) -> ActionStatus {
        let instance = match self.ensure_authenticated_instance(&instance).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(instance = %instance.name, error = %e, "could not record session state");
                return ActionStatus::failure(
                    instance.name,
                    action.failure_message(),
                    Some(instance.status),
                );
            }
        };

        if action.requires_active() && !instance.status.is_active() {
            return ActionStatus::failure(
                instance.name,
                UNREACHABLE_MESSAGE,
                Some(instance.status),
            );
        }

        let client = match self.inner.sessions.client_for(&instance) {
            Ok(client) => client,
            Err(e) => {
                check_error(&instance, &e);
                return ActionStatus::failure(
                    instance.name,
                    action.failure_message(),
                    Some(instance.status),
                );
            }
        };

        let session = instance.session();
        let outcome = match action {
            FleetAction::Pause { seconds } => client.pause_blocking(&session, seconds).await,
            FleetAction::Resume => client.resume_blocking(&session).await,
            FleetAction::Restart => client.restart_dns(&session).await,
            FleetAction::Gravity => client.update_gravity(&session).await,
        };

        match outcome {
            Ok(true) => {
                info!(instance = %instance.name, "{}", action.success_message());
                ActionStatus::success(instance.name, action.success_message(), instance.status)
            }
            Ok(false) => {
                warn!(instance = %instance.name, "{}", action.failure_message());
                ActionStatus::failure(
                    instance.name,
                    action.failure_message(),
                    Some(instance.status),
                )
            }
            Err(e) => {
                check_error(&instance, &e);
                ActionStatus::failure(
                    instance.name,
                    action.failure_message(),
                    Some(instance.status),
                )
            }
        }
    }

    // ── Stats ────────────────────────────────────────────────────

    /// Statistics summary for one instance, with its resolved status.
    pub async fn stats(&self, id: u32) -> Result<(StatsSummary, InstanceStatus), CoreError> {
        let instance = self.instance(id).await?;
        let instance = self.ensure_authenticated_instance(&instance).await?;
        let client = self.inner.sessions.client_for(&instance)?;
        let summary = client.stats_summary(&instance.session()).await?;
        Ok((summary, instance.status))
    }

    // ── Instance management ──────────────────────────────────────

    /// Add an instance and authenticate it. A fleet without a reference
    /// (empty, or hand-edited) gets one: its first instance.
    pub async fn add_instance(&self, new: NewInstance) -> Result<Instance, CoreError> {
        validate_name(&new.name)?;
        validate_url(&new.url)?;
        if new.api_key.is_empty() {
            return Err(CoreError::validation("API key must not be empty"));
        }

        let mut instance = Instance::new(0, new.name, new.url, new.api_key);
        instance = self.inner.sessions.login(&instance).await;

        let _guard = self.inner.write_lock.lock().await;
        let mut instances = self.inner.store.load().await?;
        instance.id = store::next_id(&instances);
        instances.push(instance.clone());
        if new.is_reference {
            store::assign_reference(&mut instances, instance.id);
        } else {
            store::promote_reference(&mut instances);
        }
        instance.is_reference = instances
            .iter()
            .any(|i| i.id == instance.id && i.is_reference);
        self.inner.store.save(&instances).await?;

        info!(
            id = instance.id,
            instance = %instance.name,
            status = %instance.status,
            reference = instance.is_reference,
            "instance added"
        );
        Ok(instance)
    }

    /// Remove an instance. Removing the reference promotes the first
    /// remaining instance.
    pub async fn remove_instance(&self, id: u32) -> Result<Instance, CoreError> {
        let _guard = self.inner.write_lock.lock().await;
        let mut instances = self.inner.store.load().await?;
        let pos = instances
            .iter()
            .position(|i| i.id == id)
            .ok_or(CoreError::InstanceNotFound { id })?;
        let removed = instances.remove(pos);
        if removed.is_reference {
            store::promote_reference(&mut instances);
        }
        self.inner.store.save(&instances).await?;

        info!(id, instance = %removed.name, "instance removed");
        Ok(removed)
    }

    /// Apply a partial edit. A changed URL or API key drops the session
    /// and re-authenticates.
    pub async fn edit_instance(&self, id: u32, edit: InstanceEdit) -> Result<Instance, CoreError> {
        if edit.is_empty() {
            return self.instance(id).await;
        }
        if let Some(name) = &edit.name {
            validate_name(name)?;
        }
        if let Some(url) = &edit.url {
            validate_url(url)?;
        }
        if edit
            .api_key
            .as_ref()
            .is_some_and(|key| key.expose_secret().is_empty())
        {
            return Err(CoreError::validation("API key must not be empty"));
        }

        let (edited, credentials_changed) = {
            let _guard = self.inner.write_lock.lock().await;
            let mut instances = self.inner.store.load().await?;
            let target = instances
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or(CoreError::InstanceNotFound { id })?;

            if let Some(name) = edit.name {
                target.name = name;
            }
            let mut credentials_changed = false;
            if let Some(url) = edit.url.filter(|u| *u != target.url) {
                target.url = url;
                credentials_changed = true;
            }
            if let Some(key) = edit
                .api_key
                .map(|k| k.expose_secret().to_owned())
                .filter(|k| *k != target.api_key)
            {
                target.api_key = key;
                credentials_changed = true;
            }
            if credentials_changed {
                target.deactivate(InstanceStatus::Unreachable);
            }

            match edit.is_reference {
                Some(true) => store::assign_reference(&mut instances, id),
                Some(false) => {
                    let is_reference = instances.iter().any(|i| i.id == id && i.is_reference);
                    if is_reference {
                        let other = instances
                            .iter()
                            .find(|i| i.id != id)
                            .map(|i| i.id)
                            .ok_or_else(|| {
                                CoreError::validation(
                                    "the only instance must stay the reference",
                                )
                            })?;
                        store::assign_reference(&mut instances, other);
                    }
                }
                None => {}
            }

            self.inner.store.save(&instances).await?;
            let edited = instances
                .into_iter()
                .find(|i| i.id == id)
                .ok_or(CoreError::InstanceNotFound { id })?;
            (edited, credentials_changed)
        };
        info!(id, instance = %edited.name, "instance edited");

        if credentials_changed {
            return self.ensure_authenticated_instance(&edited).await;
        }
        Ok(edited)
    }

    /// Move the reference role to `id`.
    pub async fn set_reference(&self, id: u32) -> Result<Instance, CoreError> {
        self.edit_instance(
            id,
            InstanceEdit {
                is_reference: Some(true),
                ..InstanceEdit::default()
            },
        )
        .await
    }

    // ── Background refresh ───────────────────────────────────────

    /// Refresh every `period` until `cancel` fires. In [`SyncMode::Full`]
    /// each refresh is followed by a sync of every entity kind.
    pub fn spawn_refresh_task(&self, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(refresh_task(self.clone(), period, cancel))
    }
}

async fn refresh_task<S: InstanceStore>(fleet: Fleet<S>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match fleet.refresh_all().await {
                    Ok(instances) => {
                        let active = instances.iter().filter(|i| i.status.is_active()).count();
                        debug!(active, total = instances.len(), "periodic refresh complete");
                    }
                    Err(e) => warn!(error = %e, "periodic refresh failed"),
                }

                if fleet.config().sync_mode == SyncMode::Full {
                    let failed = fleet
                        .sync_all()
                        .await
                        .into_iter()
                        .filter(|s| !s.success)
                        .count();
                    if failed > 0 {
                        warn!(failed, "periodic sync reported failures");
                    }
                }
            }
        }
    }
    debug!("refresh task stopped");
}

// ── Actions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FleetAction {
    Pause { seconds: u64 },
    Resume,
    Restart,
    Gravity,
}

impl FleetAction {
    /// Only restart refuses to run against a non-active instance.
    fn requires_active(self) -> bool {
        matches!(self, Self::Restart)
    }

    fn success_message(self) -> String {
        match self {
            Self::Pause { seconds } => {
                format!("DNS blocking paused successfully for {}", describe_seconds(seconds))
            }
            Self::Resume => "DNS blocking resumed successfully".into(),
            Self::Restart => "DNS restarted successfully".into(),
            Self::Gravity => "Gravities updated successfully".into(),
        }
    }

    fn failure_message(self) -> String {
        match self {
            Self::Pause { seconds } => {
                format!("Failed to pause DNS blocking for {}", describe_seconds(seconds))
            }
            Self::Resume => "Failed to resume DNS blocking".into(),
            Self::Restart => "Failed to restart DNS".into(),
            Self::Gravity => "Failed to update gravities".into(),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn fingerprint(instances: &[Instance]) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec(instances).map_err(CoreError::store)
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("instance name must not be empty"));
    }
    Ok(())
}

fn validate_url(url: &str) -> Result<(), CoreError> {
    let parsed =
        Url::parse(url).map_err(|e| CoreError::validation(format!("invalid URL '{url}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CoreError::validation(format!(
            "URL must use http or https: {url}"
        )));
    }
    Ok(())
}
