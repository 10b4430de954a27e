pub mod event;
pub mod inventory;
pub mod layout;
pub mod repository;
pub mod seed;

pub use event::{CatalogError, EventCatalog, NewEvent, NewSlot, DEFAULT_MAX_SEATS};
pub use inventory::{AvailabilityStore, Layout, SlotSpec};
pub use repository::EventRepository;
pub use seed::seed_demo;
