pub mod db;
pub mod error;
pub mod policy;
pub mod schedule;

pub use error::{StoreError, StoreResult};
pub use schedule::ResultVersion;
