//! Basic example demonstrating leading and trailing edge throttling.
//!
//! A progress reporter is called on every step of a fast loop, but only
//! prints at most once every 100ms. The final value always gets through.

use call_throttle::throttle;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // RUST_LOG=call_throttle=trace shows every throttling decision
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Basic Throttling Example ===\n");
    println!("Pause: 100ms, one call every 10ms for 500ms\n");

    let report = throttle(
        |step: u32| println!("  progress: step {}", step),
        Duration::from_millis(100),
    )
    .expect("valid pause inside a tokio runtime");

    for step in 0..50 {
        report.call(step);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // Let the trailing call through
    tokio::time::sleep(Duration::from_millis(150)).await;

    let snapshot = report.metrics().snapshot();
    println!("\n=== Example Complete ===");
    println!("Calls:       {}", snapshot.total_calls());
    println!("Executions:  {}", snapshot.executions());
    println!("Dropped:     {:.1}%", snapshot.drop_rate() * 100.0);
}
