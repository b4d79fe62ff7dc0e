mod utils;
#[allow(unused)]
use utils::*;

use mock_service::Behavior;
use stampede::prelude::*;
use std::time::Duration;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn short_plan() -> Vec<Stage> {
    vec![
        Stage::new(ms(500), 2),
        Stage::new(ms(1_000), 4),
        Stage::new(ms(500), 0),
    ]
}

#[tokio::test]
async fn healthy_endpoint_passes_everything() {
    init();
    let base_url = spawn_mock(3101, Behavior::Ok).await;

    let report = LoadTest::new(RunConfig::new(base_url))
        .stages(short_plan())
        .pacing(ms(50))
        .await
        .unwrap();

    assert!(report.iterations > 0);
    assert_eq!(report.latency_samples, report.iterations);
    assert_eq!(report.success_rate, 1.0);
    for check in &report.checks {
        assert_eq!(check.fails, 0);
        assert_eq!(check.passes, report.iterations);
    }
    assert!(report.passed(), "{report}");
    assert!(report.as_result().is_ok());
}

#[tokio::test]
async fn failing_endpoint_breaches_rate_threshold() {
    init();
    let base_url = spawn_mock(3102, Behavior::ServerError).await;

    let report = LoadTest::new(RunConfig::new(base_url))
        .stages(short_plan())
        .pacing(ms(50))
        .await
        .unwrap();

    assert!(report.iterations > 0);
    assert_eq!(report.success_rate, 0.0);
    for check in &report.checks {
        assert_eq!(check.passes, 0);
        assert_eq!(check.fails, report.iterations);
    }
    assert!(!report.passed(), "{report}");
    assert!(report.as_result().is_err());
}

#[tokio::test]
async fn transport_failures_still_counted() {
    init();

    // Nothing listens on the discard port; every request fails at connect.
    let report = LoadTest::new(RunConfig::new("http://127.0.0.1:9"))
        .stages(vec![Stage::new(ms(500), 2), Stage::new(ms(500), 0)])
        .pacing(ms(50))
        .await
        .unwrap();

    assert!(report.iterations > 0);
    assert_eq!(report.latency_samples, report.iterations);
    assert_eq!(report.success_rate, 0.0);
    for check in &report.checks {
        assert_eq!(check.fails, report.iterations);
    }
    assert!(!report.passed());
}

#[tokio::test]
async fn aborted_iterations_record_failure() {
    init();
    // Responses take far longer than the grace period, so every started
    // iteration is torn down mid-request.
    let base_url = spawn_mock(3105, Behavior::Delay(Duration::from_secs(30))).await;

    let test = LoadTest::new(RunConfig::new(base_url))
        .stages(vec![Stage::new(ms(100), 1), Stage::new(Duration::from_secs(60), 1)])
        .pacing(ms(50))
        .grace_period(ms(200));
    let stopper = test.stopper();

    let handle = tokio::spawn(test);
    tokio::time::sleep(ms(500)).await;
    stopper.stop();

    let report = tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("run did not stop")
        .unwrap()
        .unwrap();

    assert!(report.iterations >= 1, "{report}");
    assert_eq!(report.latency_samples, report.iterations);
    assert_eq!(report.success_rate, 0.0);
    for check in &report.checks {
        assert_eq!(check.passes, 0);
        assert_eq!(check.fails, report.iterations);
    }
    assert!(!report.passed(), "{report}");
}

#[tokio::test]
async fn slow_endpoint_breaches_latency_threshold() {
    init();
    let base_url = spawn_mock(3103, Behavior::Delay(ms(250))).await;

    let report = LoadTest::new(RunConfig::new(base_url))
        .stages(vec![Stage::new(ms(500), 2), Stage::new(ms(500), 0)])
        .pacing(ms(50))
        .await
        .unwrap();

    assert!(report.iterations > 0);
    // Every request succeeds, but p95 sits above the 200ms bound.
    assert_eq!(report.success_rate, 1.0);
    assert!(report.latency_p95 >= ms(200));
    assert!(!report.passed(), "{report}");
}

#[tokio::test]
async fn stop_handle_halts_long_run() {
    init();
    let base_url = spawn_mock(3104, Behavior::Ok).await;

    let test = LoadTest::new(RunConfig::new(base_url))
        .stages(vec![Stage::new(Duration::from_secs(120), 5)])
        .pacing(ms(50));
    let stopper = test.stopper();

    let handle = tokio::spawn(test);
    tokio::time::sleep(Duration::from_secs(1)).await;
    stopper.stop();

    let report = tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("run did not stop")
        .unwrap()
        .unwrap();
    assert!(report.iterations > 0);
}
