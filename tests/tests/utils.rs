use mock_service::Behavior;
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
            std::process::exit(1);
        }));

        FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_env_filter("stampede=debug,mock_service=debug")
            .init();
    });
}

/// Spawns a mock login API on the given port and returns its base URL.
#[allow(unused)]
pub async fn spawn_mock(port: u16, behavior: Behavior) -> String {
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse().unwrap();
    tokio::spawn(async move { mock_service::run(addr, behavior).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    format!("http://127.0.0.1:{port}")
}
