#![forbid(unsafe_code)]

pub mod accounts;
pub mod record;
pub mod repository;
pub mod sqlite;

pub use repository::{Storage, StorageError};
