//! Lead lifecycle: tag, read, update, delete, summarize, export

use super::require_user;
use crate::export::{self, ExportArtifact, ExportOptions};
use crate::filters::{LeadFilterOptions, LeadStats};
use crate::models::{Lead, LeadInput, LeadUpdate};
use crate::store::{LocalStore, SyncState};
use crate::sync::{DeleteOutcome, Reconciler, ResyncReport, WriteOutcome};
use crate::{time, uuid_utils, Error, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn LocalStore>,
    sync: Reconciler,
}

impl LeadService {
    pub fn new(store: Arc<dyn LocalStore>, sync: Reconciler) -> Self {
        Self { store, sync }
    }

    /// Tag a new property
    pub async fn create_lead(&self, user_id: &str, input: LeadInput) -> Result<WriteOutcome<Lead>> {
        require_user(user_id)?;
        let lead = Lead::new(
            uuid_utils::new_record_id(),
            user_id.to_string(),
            input,
            time::now_millis(),
        )?;

        self.store.put_lead(&lead).await?;
        info!(
            "Tagged lead {} for {} (distress {})",
            lead.id, user_id, lead.distress_score
        );

        let remote = self.sync.push_lead(self.store.as_ref(), &lead).await;
        Ok(WriteOutcome {
            record: lead,
            remote,
        })
    }

    /// Read one of the user's leads from the local store
    pub async fn get_lead(&self, user_id: &str, id: &str) -> Result<Lead> {
        require_user(user_id)?;
        match self.store.get_lead(id).await? {
            Some(lead) if lead.user_id == user_id => Ok(lead),
            _ => Err(Error::NotFound(format!("lead {}", id))),
        }
    }

    /// The user's leads, newest first, narrowed by `filter`
    pub async fn list_leads(&self, user_id: &str, filter: &LeadFilterOptions) -> Result<Vec<Lead>> {
        require_user(user_id)?;
        filter.validate()?;
        let leads = self.store.leads_for_user(user_id).await?;
        Ok(filter.apply(leads))
    }

    /// Apply a partial update; the score follows the merged indicators
    pub async fn update_lead(
        &self,
        user_id: &str,
        id: &str,
        update: LeadUpdate,
    ) -> Result<WriteOutcome<Lead>> {
        let current = self.get_lead(user_id, id).await?;
        let lead = current.merged(update, time::now_millis())?;

        self.store.put_lead(&lead).await?;
        info!("Updated lead {}", lead.id);

        let remote = self.sync.push_lead(self.store.as_ref(), &lead).await;
        Ok(WriteOutcome {
            record: lead,
            remote,
        })
    }

    /// Remove a lead locally, then from the remote
    pub async fn delete_lead(&self, user_id: &str, id: &str) -> Result<DeleteOutcome> {
        self.get_lead(user_id, id).await?;

        if !self.store.delete_lead(id).await? {
            return Err(Error::NotFound(format!("lead {}", id)));
        }
        info!("Deleted lead {}", id);

        let remote = self.sync.delete_lead(id).await;
        Ok(DeleteOutcome {
            id: id.to_string(),
            remote,
        })
    }

    pub async fn sync_state(&self, user_id: &str, id: &str) -> Result<SyncState> {
        self.get_lead(user_id, id).await?;
        self.store
            .lead_sync_state(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("lead {}", id)))
    }

    pub async fn stats(&self, user_id: &str) -> Result<LeadStats> {
        require_user(user_id)?;
        let leads = self.store.leads_for_user(user_id).await?;
        Ok(LeadStats::compute(&leads, time::now_millis()))
    }

    /// Export the user's leads matching `filter`
    pub async fn export(
        &self,
        user_id: &str,
        filter: &LeadFilterOptions,
        options: &ExportOptions,
    ) -> Result<ExportArtifact> {
        let leads = self.list_leads(user_id, filter).await?;
        info!(
            "Exporting {} leads for {} as {}",
            leads.len(),
            user_id,
            options.format
        );
        export::export_leads(&leads, options, time::now_millis())
    }

    /// Explicitly push every unsynced lead and route of the user
    pub async fn resync_pending(&self, user_id: &str) -> Result<ResyncReport> {
        require_user(user_id)?;
        self.sync.resync_pending(self.store.as_ref(), user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DistressIndicators;
    use crate::store::MemoryStore;
    use crate::sync::{RemoteOutcome, RemoteStore};
    use crate::models::Route;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Remote that records calls and fails on demand
    #[derive(Default)]
    struct FlakyRemote {
        failing: AtomicBool,
        upserts: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl FlakyRemote {
        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(Error::Remote("offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RemoteStore for FlakyRemote {
        async fn upsert_lead(&self, _lead: &Lead) -> Result<()> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            self.check()
        }
        async fn delete_lead(&self, _id: &str) -> Result<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.check()
        }
        async fn upsert_route(&self, _route: &Route) -> Result<()> {
            self.check()
        }
        async fn delete_route(&self, _id: &str) -> Result<()> {
            self.check()
        }
    }

    fn service(remote: Option<Arc<FlakyRemote>>) -> LeadService {
        let remote = remote.map(|r| r as Arc<dyn RemoteStore>);
        LeadService::new(Arc::new(MemoryStore::new()), Reconciler::new(remote))
    }

    fn input() -> LeadInput {
        LeadInput {
            address: "21 Jump St".into(),
            lat: 45.5,
            lng: -122.6,
            indicators: DistressIndicators {
                peeling_paint: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_read_without_remote() {
        let svc = service(None);
        let created = svc.create_lead("u1", input()).await.unwrap();
        assert_eq!(created.remote, RemoteOutcome::Skipped);
        assert_eq!(created.record.distress_score, 14);

        let read = svc.get_lead("u1", &created.record.id).await.unwrap();
        assert_eq!(read, created.record);
        assert_eq!(
            svc.sync_state("u1", &read.id).await.unwrap(),
            SyncState::Pending
        );
    }

    #[tokio::test]
    async fn test_remote_failure_is_not_an_error() {
        let remote = Arc::new(FlakyRemote::default());
        remote.failing.store(true, Ordering::SeqCst);
        let svc = service(Some(remote.clone()));

        let created = svc.create_lead("u1", input()).await.unwrap();
        assert!(matches!(created.remote, RemoteOutcome::Failed(_)));
        assert_eq!(remote.upserts.load(Ordering::SeqCst), 1);

        // Committed locally regardless
        let read = svc.get_lead("u1", &created.record.id).await.unwrap();
        assert_eq!(read, created.record);
        assert!(matches!(
            svc.sync_state("u1", &read.id).await.unwrap(),
            SyncState::Failed(_)
        ));

        // Never retried on its own
        assert_eq!(remote.upserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_update_recomputes_score() {
        let svc = service(Some(Arc::new(FlakyRemote::default())));
        let created = svc.create_lead("u1", input()).await.unwrap();
        assert!(created.remote.is_synced());

        let update = LeadUpdate {
            indicators: Some(DistressIndicators {
                peeling_paint: true,
                for_sale_sign: true,
                other: vec!["Mail piling up".into()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let updated = svc.update_lead("u1", &created.record.id, update).await.unwrap();
        // (2 + 1) / (7 + 1)
        assert_eq!(updated.record.distress_score, 38);
        assert!(updated.record.updated_at >= created.record.updated_at);
        assert_eq!(updated.record.created_at, created.record.created_at);

        let read = svc.get_lead("u1", &created.record.id).await.unwrap();
        assert_eq!(read.distress_score, 38);
    }

    #[tokio::test]
    async fn test_delete_succeeds_locally_when_remote_fails() {
        let remote = Arc::new(FlakyRemote::default());
        let svc = service(Some(remote.clone()));
        let created = svc.create_lead("u1", input()).await.unwrap();

        remote.failing.store(true, Ordering::SeqCst);
        let deleted = svc.delete_lead("u1", &created.record.id).await.unwrap();
        assert!(matches!(deleted.remote, RemoteOutcome::Failed(_)));
        assert_eq!(remote.deletes.load(Ordering::SeqCst), 1);

        let err = svc.get_lead("u1", &created.record.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(svc
            .list_leads("u1", &LeadFilterOptions::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_leads_are_partitioned_by_owner() {
        let svc = service(None);
        let mine = svc.create_lead("u1", input()).await.unwrap().record;
        svc.create_lead("u2", input()).await.unwrap();

        let listed = svc.list_leads("u1", &LeadFilterOptions::default()).await.unwrap();
        assert_eq!(listed, vec![mine.clone()]);

        let err = svc.get_lead("u2", &mine.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(svc.delete_lead("u2", &mine.id).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_write() {
        let svc = service(None);
        let mut bad = input();
        bad.lat = 123.0;
        assert!(matches!(
            svc.create_lead("u1", bad).await.unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(svc.list_leads("u1", &LeadFilterOptions::default()).await.unwrap().is_empty());
        assert!(svc.create_lead("", input()).await.is_err());
    }

    #[tokio::test]
    async fn test_resync_pushes_failed_records() {
        let remote = Arc::new(FlakyRemote::default());
        remote.failing.store(true, Ordering::SeqCst);
        let svc = service(Some(remote.clone()));
        let created = svc.create_lead("u1", input()).await.unwrap();

        remote.failing.store(false, Ordering::SeqCst);
        let report = svc.resync_pending("u1").await.unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.synced, 1);
        assert_eq!(
            svc.sync_state("u1", &created.record.id).await.unwrap(),
            SyncState::Synced
        );

        // Nothing left to push
        let report = svc.resync_pending("u1").await.unwrap();
        assert_eq!(report.attempted, 0);
    }

    #[tokio::test]
    async fn test_stats_and_export() {
        let svc = service(None);
        svc.create_lead("u1", input()).await.unwrap();
        svc.create_lead("u1", input()).await.unwrap();

        let stats = svc.stats("u1").await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.this_week, 2);

        let artifact = svc
            .export("u1", &LeadFilterOptions::default(), &ExportOptions::default())
            .await
            .unwrap();
        assert_eq!(artifact.mime_type, "text/csv");
        let csv = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
