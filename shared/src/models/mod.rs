//! Collaborator-facing data models
//!
//! Request/response shapes for the payment, delivery and customer services,
//! plus the typed request roles forwarded by the gateway.

pub mod customer;
pub mod delivery;
pub mod payment;
pub mod role;

// Re-exports
pub use customer::CustomerProfile;
pub use delivery::{AgentCreate, AgentResponse, AgentStatus, DeliveryStatus, DeliveryStatusUpdate};
pub use payment::{PaymentMethod, PaymentRequest, PaymentResponse, PaymentStatus};
pub use role::{Role, RoleSet};
