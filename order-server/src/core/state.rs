//! 服务器状态 - 持有所有服务的单例引用

use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::clients::{HttpCustomerDirectory, HttpDeliveryGateway, HttpPaymentGateway};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::OrderRepository;
use crate::orders::{OrderService, OrderSettings};

/// 服务器状态 - 所有字段都是共享句柄，Clone 成本极低
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | orders | 订单编排服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库
    pub db: Surreal<Db>,
    /// 订单编排服务
    pub orders: OrderService,
    /// 全局取消令牌（后台任务监听 shutdown）
    shutdown: CancellationToken,
}

impl ServerState {
    /// Initialize the database, collaborator gateways and the orchestrator.
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let db_service = DbService::open(&config.db_path()).await?;
        let db = db_service.db.clone();

        let shutdown = CancellationToken::new();

        let payment = Arc::new(HttpPaymentGateway::new(
            &config.payment_service_url,
            config.gateway_timeout,
        ));
        let delivery = Arc::new(HttpDeliveryGateway::new(
            &config.delivery_service_url,
            config.gateway_timeout,
        ));
        let customers = Arc::new(HttpCustomerDirectory::new(
            &config.customer_service_url,
            config.gateway_timeout,
        ));

        let settings = OrderSettings {
            place_timeout: config.place_timeout,
            lock_timeout: config.lock_timeout,
            auto_complete_min: config.auto_complete_min,
            auto_complete_max: config.auto_complete_max,
        };

        let orders = OrderService::new(
            OrderRepository::new(db.clone()),
            payment,
            delivery,
            customers,
            settings,
            shutdown.child_token(),
        );

        tracing::info!("Server state initialized");

        Ok(Self {
            config: config.clone(),
            db,
            orders,
            shutdown,
        })
    }

    /// 获取取消令牌（shutdown 时取消所有后台任务）
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
