pub mod config;
pub mod import;
pub mod jobs;
pub mod limits;
pub mod model;
pub mod observability;
pub mod overlay;
pub mod snapshot;
pub mod store;

pub use config::Config;
pub use import::{ImportRow, SourceError};
pub use jobs::{Job, JobKind, JobReport};
pub use model::{Reservation, ServiceCycle, Stay};
pub use overlay::{RuleOverlay, ServiceOverlay};
pub use store::{BookingStore, StoreError};
