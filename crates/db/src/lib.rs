pub mod fixtures;
pub mod repositories;
pub mod store;

pub use fixtures::{DemoDataset, SeedResult, VerificationResult};
pub use repositories::{
    CallSessionRepository, HotelRepository, InMemoryCallSessionStore, InMemorySessionStore,
    RepositoryError, SessionRepository,
};
pub use store::{JsonHotelStore, StoreError};
