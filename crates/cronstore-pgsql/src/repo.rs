//! Repositories over the store's three tables.

pub mod jobs;
pub mod lock;
pub mod logs;

pub use jobs::PgJobRepo;
pub use lock::PgLockRepo;
pub use logs::PgLogRepo;
