use inbound_receiving_log::{
    build_router, create_pool, init_schema, AppConfig, ReceivingService, ReferenceCatalog,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 参考数据
    let catalog = ReferenceCatalog::from_config(&config.reference);
    if config.reference.seed_samples {
        catalog.seed_samples_if_missing()?;
    }

    // 创建数据库连接池并建表
    let pool = create_pool(&config.database).await?;
    init_schema(&pool).await?;
    info!("Database pool created");

    let service = Arc::new(ReceivingService::new(pool, catalog));
    let app = build_router(service);

    // 启动服务器
    let addr = config.listen_addr();
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/items/:item_code/:shipment_ref - item lookup");
    info!("  GET  /api/receipts                       - list receipts");
    info!("  POST /api/receipts                       - record receipt");
    info!("  PUT  /api/receipts/:id                   - edit receipt");
    info!("  GET  /api/reports/detail                 - detail export");
    info!("  GET  /api/reports/summary                - summary export");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
