// ABOUTME: Core domain types for ratekeeper: the rate record, bill items, and user accounts.
// ABOUTME: Pure data and validation with no storage or HTTP concerns.

pub mod error;
pub mod model;
pub mod user;

pub use error::ValidationError;
pub use model::{BillItem, BillItemInput, DataFields, DataRecord, DataUpdate};
pub use user::{Credentials, User};
