use order_server::common::logger;
use order_server::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境与日志
    dotenv::dotenv().ok();

    let config = Config::from_env();
    logger::init_logger(
        &config.log_level,
        config.is_production(),
        config.log_dir.as_deref(),
    )?;

    tracing::info!("Order server starting...");

    // 2. 初始化服务器状态
    let state = ServerState::initialize(&config).await?;

    // 3. 启动 HTTP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
