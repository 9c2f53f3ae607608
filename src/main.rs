//! 人力资源系统主入口

use hrm_system::{
    access::AccessControl,
    config::AppConfig,
    db,
    handlers::health,
    middleware::AppState,
    repository::{LeaveStore, PgAttendanceStore, PgDirectoryStore, PgLeaveStore},
    routes,
    services::{DashboardService, LeaveService},
    telemetry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("hrm-system {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    if let Ok(path) = std::env::var("HRM_ENV") {
        dotenv::from_filename(format!(".env.{}", path)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    // 设置应用启动时间
    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志与指标
    telemetry::init_telemetry(&config);
    telemetry::init_metrics();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "HRM System starting...");

    // 3. 权限表（配置错误在这里立即失败，而不是等到第一次鉴权）
    let access = Arc::new(AccessControl::builtin().map_err(|e| {
        anyhow::anyhow!("Failed to build access control table: {}", e)
    })?);

    // 4. 数据库连接池 + 迁移
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;
    db::record_pool_metrics(&db_pool);

    tracing::info!("Database initialized");

    // 5. 存储与服务
    let leave_store: Arc<dyn LeaveStore> = Arc::new(PgLeaveStore::new(db_pool.clone()));
    let attendance_store = Arc::new(PgAttendanceStore::new(db_pool.clone()));
    let directory = Arc::new(PgDirectoryStore::new(db_pool.clone()));

    let leave_service = Arc::new(LeaveService::new(
        leave_store.clone(),
        access.clone(),
        Duration::from_secs(config.workflow.transition_timeout_secs),
    ));

    let dashboard_service = Arc::new(DashboardService::new(
        leave_service.clone(),
        attendance_store,
        directory,
        access.clone(),
    ));

    let app_state = Arc::new(AppState {
        config: config.clone(),
        access,
        leave_service,
        dashboard_service,
        leave_store,
    });

    // 6. 构建路由
    let app = routes::create_router(app_state);

    // 7. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        "Server listening"
    );

    // 8. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 超时后强制关闭
    tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
    tracing::warn!("Graceful shutdown timeout reached, forcing exit");
}

/// 打印帮助信息
fn print_help() {
    println!("hrm-system {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: hrm-system [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --version     Print version information and exit");
    println!("  --help        Print this help message and exit");
    println!();
    println!("Environment:");
    println!("  All configuration is provided via HRM_* environment variables.");
    println!("  See .env.example for the available options.");
}
