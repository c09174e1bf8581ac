//! Food-supply tracking engine.
//!
//! Orchestrates creation, updates, and the finish transition of food
//! supplies, enforcing validation and the one-active-supply-per-category
//! invariant, and enriching read paths with remaining-supply projections
//! and consumption reports. Storage and the pet-ownership check are
//! injected collaborators, so the engine itself holds no state and does
//! no I/O beyond what the store performs.

pub mod clock;
pub mod service;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use service::FoodService;
pub use store::{PetOwnership, PgPetOwnership, PgSupplyStore, SupplyStore};
