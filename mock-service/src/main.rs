use mock_service::{rps_measure_task, run, Behavior};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("mock_service=debug")
        .init();

    tokio::task::spawn(async { rps_measure_task().await });

    run("0.0.0.0:8080".parse().unwrap(), Behavior::Ok).await;
}
