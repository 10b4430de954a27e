pub mod coordinator;
pub mod ledger;

pub use coordinator::ReservationCoordinator;
pub use ledger::InMemoryLedger;
