// ABOUTME: Persistence layer for ratekeeper: an embedded SQLite document store.
// ABOUTME: Holds user credentials and the single current rate record.

pub mod db;
pub mod error;
pub mod records;
pub mod users;

pub use db::Database;
pub use error::StoreError;
pub use records::RecordStore;
pub use users::UserStore;
