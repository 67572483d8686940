use doh_gateway::{
    subsystem_names, AdminServer, AppError, Args, Config, DoHServer, RequestHandler,
    UdpExchangeClient, UpstreamTarget,
};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};
use tracing::{error, info};

// 使用 mimalloc 分配器提高内存效率
#[global_allocator]
static GLOBAL: MiMalloc = mimalloc::MiMalloc;

fn init_logging(args: &Args) {
    // RUST_LOG 优先，否则调试模式输出 debug，默认只输出 info 及以上级别
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_line_number(false)
        .with_env_filter(args.log_filter(rust_log.as_deref()))
        .init();
}

// 程序入口
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 解析命令行参数
    let args = Args::parse_args();

    // 初始化日志
    init_logging(&args);

    // 验证参数
    if let Err(e) = args.validation() {
        error!("Invalid command line arguments: {}", e);
        process::exit(1);
    }

    info!("Starting DoH to UDP DNS gateway");

    // 加载配置
    let config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => {
                info!("Successfully loaded configuration: {:?}", path);
                config
            }
            Err(e) => {
                error!("Failed to load configuration file: {}", e);
                process::exit(1);
            }
        },
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    // 如果是测试模式，成功验证配置后退出
    if args.test_config {
        info!("Configuration file validation successful");
        return Ok(());
    }

    // 创建应用组件
    let components = match create_components(config, args.upstream.as_deref()) {
        Ok(components) => components,
        Err(e) => {
            error!("Failed to create application components: {}", e);
            process::exit(1);
        }
    };

    // 创建优雅关闭顶层管理器
    let toplevel = Toplevel::new(|s| async move {
        // 启动DoH服务器子系统
        let doh_server = components.doh_server;
        s.start(SubsystemBuilder::new(
            subsystem_names::DOH_SERVER,
            move |s| async move { doh_server.run(s).await },
        ));
        // 启动管理服务器子系统（如果配置）
        if let Some(admin_server) = components.admin_server {
            s.start(SubsystemBuilder::new(
                subsystem_names::ADMIN_SERVER,
                move |s| async move { admin_server.run(s).await },
            ));
        }
    });

    // 等待关闭
    info!("All services started, waiting for requests...");
    match toplevel
        .catch_signals()
        .handle_shutdown_requests(tokio::time::Duration::from_secs(args.shutdown_timeout))
        .await
    {
        Ok(_) => {
            info!("Application gracefully shut down");
            Ok(())
        }
        Err(e) => {
            error!("Application shutdown error: {}", e);
            process::exit(1);
        }
    }
}

// 应用组件
struct AppComponents {
    // DoH 服务器
    doh_server: DoHServer,
    // 管理服务器（可选）
    admin_server: Option<AdminServer>,
}

// 创建应用组件
fn create_components(config: Config, env_upstream: Option<&str>) -> Result<AppComponents, AppError> {
    // 选择上游，启动后只读
    let target = UpstreamTarget::select(&config.upstream, env_upstream)?;

    let client = UdpExchangeClient::new(
        config.upstream.timeout_duration(),
        config.upstream.max_inflight,
    );
    info!(
        "Upstream exchange client initialized, timeout: {}s, max in-flight: {}",
        config.upstream.timeout, config.upstream.max_inflight
    );

    // 创建请求处理器
    let handler = Arc::new(RequestHandler::new(client, target));

    // 创建 DoH 服务器
    let listen_http: SocketAddr = config.server.listen_http.parse()?;
    let doh_server = DoHServer::new(listen_http, config.server.max_message_size, handler);

    // 创建管理服务器
    let admin_server = match &config.admin {
        Some(admin_config) => Some(AdminServer::new(admin_config.listen.parse()?)),
        None => {
            info!("Admin server configuration not provided, health and metrics endpoints disabled");
            None
        }
    };

    info!(
        "DoH server initialized with HTTP: {}, max message size: {} bytes",
        listen_http, config.server.max_message_size
    );

    // 返回应用组件
    Ok(AppComponents {
        doh_server,
        admin_server,
    })
}
