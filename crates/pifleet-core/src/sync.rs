// ── Reference synchronizer ──
//
// Replays one entity collection from the reference onto every other
// instance. Each upsert is a full-state PUT keyed by the natural key, so
// repeated runs converge after a partial failure; nothing is rolled back.

use futures_util::future::join_all;
use pifleet_api::{Adlist, Client, ConfigEntity, Domain, Group};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::fleet::Fleet;
use crate::model::{ActionStatus, EntityKind, Instance, InstanceStatus, UNKNOWN_INSTANCE};
use crate::session::check_error;
use crate::store::{self, InstanceStore};

const NOT_ACTIVE_MESSAGE: &str = "Instance is not active";

impl<S: InstanceStore> Fleet<S> {
    /// Propagate one entity kind from the reference to every other
    /// instance. Returns one status per non-reference instance, or a single
    /// failure when the reference data is unavailable.
    pub async fn sync_from_reference(&self, kind: EntityKind) -> Vec<ActionStatus> {
        match kind {
            EntityKind::Groups => self.sync_entities::<Group>(kind).await,
            EntityKind::Lists => self.sync_entities::<Adlist>(kind).await,
            EntityKind::Domains => self.sync_entities::<Domain>(kind).await,
            EntityKind::Clients => self.sync_entities::<Client>(kind).await,
        }
    }

    /// Propagate every entity kind, groups first.
    pub async fn sync_all(&self) -> Vec<ActionStatus> {
        let mut statuses = Vec::new();
        for kind in EntityKind::iter() {
            statuses.extend(self.sync_from_reference(kind).await);
        }
        statuses
    }

    async fn sync_entities<E: ConfigEntity>(&self, kind: EntityKind) -> Vec<ActionStatus> {
        info!(%kind, "synchronizing from reference");

        let instances = match self.instances().await {
            Ok(instances) => instances,
            Err(e) => {
                warn!(%kind, error = %e, "cannot load instances");
                return vec![ActionStatus::failure(
                    UNKNOWN_INSTANCE,
                    format!("Failed to update {kind}: {e}"),
                    None,
                )];
            }
        };

        let reference = match store::reference(&instances) {
            Ok(reference) => reference,
            Err(e) => {
                warn!(%kind, "no reference instance");
                return vec![ActionStatus::failure(
                    UNKNOWN_INSTANCE,
                    e.to_string(),
                    Some(InstanceStatus::Unreachable),
                )];
            }
        };

        let entities = match self.fetch_reference::<E>(reference).await {
            Ok(entities) => entities,
            Err(status) => return vec![status],
        };
        debug!(%kind, count = entities.len(), reference = %reference.name, "fetched reference entities");

        let targets = instances.iter().filter(|i| !i.is_reference);
        join_all(targets.map(|target| self.replay(target, &entities, kind))).await
    }

    /// Authenticate the reference and list its collection. Any failure
    /// becomes the single status for the whole run.
    async fn fetch_reference<E: ConfigEntity>(
        &self,
        reference: &Instance,
    ) -> Result<Vec<E>, ActionStatus> {
        let kind = E::COLLECTION;
        let unavailable = |instance: &Instance| {
            ActionStatus::failure(
                instance.name.clone(),
                format!("Couldn't get the {kind} from the reference"),
                Some(instance.status),
            )
        };

        let reference = match self.ensure_authenticated_instance(reference).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(reference = %reference.name, error = %e, "could not record session state");
                return Err(unavailable(reference));
            }
        };

        let client = self
            .sessions()
            .client_for(&reference)
            .map_err(|e| {
                check_error(&reference, &e);
                unavailable(&reference)
            })?;

        match client.list_entities::<E>(&reference.session()).await {
            Ok(Some(entities)) => Ok(entities),
            Ok(None) => {
                warn!(reference = %reference.name, collection = kind, "reference response lacked the collection");
                Err(unavailable(&reference))
            }
            Err(e) => {
                check_error(&reference, &e);
                Err(unavailable(&reference))
            }
        }
    }

    /// Upsert every entity on one target, in order. A failed upsert does
    /// not stop the ones after it but fails the instance.
    async fn replay<E: ConfigEntity>(
        &self,
        target: &Instance,
        entities: &[E],
        kind: EntityKind,
    ) -> ActionStatus {
        if !target.status.is_active() {
            debug!(instance = %target.name, status = %target.status, "skipping inactive instance");
            return ActionStatus::failure(
                target.name.clone(),
                NOT_ACTIVE_MESSAGE,
                Some(target.status),
            );
        }

        let failed = |instance: &Instance| {
            ActionStatus::failure(
                instance.name.clone(),
                format!("Failed to update {kind}"),
                Some(instance.status),
            )
        };

        let target = match self.ensure_authenticated_instance(target).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(instance = %target.name, error = %e, "could not record session state");
                return failed(target);
            }
        };
        if !target.status.is_active() {
            return ActionStatus::failure(
                target.name.clone(),
                NOT_ACTIVE_MESSAGE,
                Some(target.status),
            );
        }

        let client = match self.sessions().client_for(&target) {
            Ok(client) => client,
            Err(e) => {
                check_error(&target, &e);
                return failed(&target);
            }
        };

        let session = target.session();
        let mut all_ok = true;
        for entity in entities {
            match client.upsert_entity(&session, entity).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(instance = %target.name, key = %entity.display_key(), "{kind} upsert rejected");
                    all_ok = false;
                }
                Err(e) => {
                    check_error(&target, &e);
                    all_ok = false;
                }
            }
        }

        if all_ok {
            info!(instance = %target.name, count = entities.len(), "{kind} synchronized");
            ActionStatus::success(
                target.name.clone(),
                format!("{} updated successfully", kind.title()),
                target.status,
            )
        } else {
            failed(&target)
        }
    }
}
