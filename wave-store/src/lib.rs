pub mod app_config;
pub mod database;
pub mod event_repo;
pub mod ledger_repo;

pub use database::DbClient;
pub use event_repo::PgEventRepository;
pub use ledger_repo::PgBookingLedger;
