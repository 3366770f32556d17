//! Persisted data models

pub mod order;

pub use order::{Order, OrderItem};
