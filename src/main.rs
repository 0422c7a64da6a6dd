use bill_desk::{api, create_pool, db, AppConfig, BillDesk, PgBillStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    if config.database.run_migrations {
        db::run_migrations(&pool).await?;
        info!("Migrations applied");
    }

    let desk = Arc::new(BillDesk::new(Arc::new(PgBillStore::new(pool)), &config));
    match desk.refresh().await {
        Ok(count) => info!("Loaded {} bills", count),
        Err(e) => tracing::warn!("Initial bill list load failed: {}", e),
    }

    let app = api::router(desk);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET    /api/bills?q=            - list / search bills");
    info!("  POST   /api/bills               - create bill");
    info!("  GET    /api/bills/:id           - open bill for editing");
    info!("  PUT    /api/bills/:id           - update bill");
    info!("  DELETE /api/bills/:id?confirm=true");
    info!("  GET    /api/bills/:id/print     - printable bill");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
