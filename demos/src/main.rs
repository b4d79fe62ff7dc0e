//! Runs the recorded login ramp against `BASE_URL` and exits non-zero when
//! the thresholds are breached.
use stampede::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("stampede=info")
        .init();

    let report = login_scenario().await?;
    println!("{report}");

    report.as_result()?;
    Ok(())
}
