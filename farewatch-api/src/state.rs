use std::sync::Arc;

use farewatch_archive::{ArchivePolicy, ArchiveStore};
use farewatch_core::feed::DealFeed;
use farewatch_core::ReferenceTables;
use farewatch_curate::{CuratedDealStore, DealClassifier};
use farewatch_dispatch::{DeliveryLedger, Notifier, Pacer, RecipientDirectory};

#[derive(Clone)]
pub struct AuthSettings {
    pub trigger_token: String,
}

#[derive(Clone)]
pub struct CurationSettings {
    pub min_score: u8,
    pub max_candidates: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<dyn DealFeed>,
    pub curated: Arc<dyn CuratedDealStore>,
    pub ledger: Arc<dyn DeliveryLedger>,
    pub directory: Arc<dyn RecipientDirectory>,
    pub notifier: Arc<dyn Notifier>,
    pub classifier: Arc<dyn DealClassifier>,
    pub archive: Arc<dyn ArchiveStore>,
    pub pacer: Arc<dyn Pacer>,
    pub tables: Arc<ReferenceTables>,
    pub curation: CurationSettings,
    pub archive_policy: ArchivePolicy,
    pub auth: AuthSettings,
}
