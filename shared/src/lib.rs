//! Shared types for the food-delivery order stack
//!
//! Wire-level types used by the order server and any client of it: the
//! order status state machine, order DTOs, collaborator contracts
//! (payment, delivery agent, customer profile), typed request roles and
//! time utilities.

pub mod models;
pub mod order;
pub mod util;

// Re-export 公共类型
pub use models::{Role, RoleSet};
pub use order::{OrderDto, OrderItemDto, OrderRequest, OrderStatus, OrderStatusUpdate};
