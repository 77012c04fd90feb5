//! Record store contract.
//!
//! Characters and personas are persisted by an external collaborator. The
//! core only knows this interface and never interprets the storage format.

mod model;
mod store;

pub use model::{Record, RecordKind, generate_record_id};
pub use store::RecordStore;
