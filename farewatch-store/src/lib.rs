pub mod app_config;
pub mod archive_repo;
pub mod curated_repo;
pub mod database;
pub mod feed;
pub mod ledger_repo;
pub mod recipient_repo;

pub use archive_repo::PgArchive;
pub use curated_repo::PgCuratedDeals;
pub use database::DbClient;
pub use feed::PgDealFeed;
pub use ledger_repo::PgDeliveryLedger;
pub use recipient_repo::PgRecipientDirectory;
