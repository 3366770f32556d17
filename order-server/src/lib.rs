//! Order Server - 外卖订单生命周期服务
//!
//! # 架构概述
//!
//! 订单编排服务：每个幂等令牌只创建一次订单，状态机驱动订单流转，
//! 并向支付/配送/客户服务分发副作用。
//!
//! - **编排器** (`orders`): 下单、状态流转、延迟自动完成
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **外部服务** (`clients`): 支付、配送、客户资料网关
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── common/        # 错误、日志
//! ├── db/            # 数据库层
//! ├── clients/       # 外部服务网关
//! ├── orders/        # 订单编排
//! ├── api/           # HTTP 处理器
//! └── routes/        # 路由组装
//! ```

pub mod api;
pub mod clients;
pub mod common;
pub mod core;
pub mod db;
pub mod orders;
pub mod routes;

// Re-export 公共类型
pub use crate::common::{AppError, AppResult};
pub use crate::core::{Config, Server, ServerState};
pub use crate::orders::{OrderService, OrderSettings};
