//! Example: retrying a flaky service with `Backoff` and `retry`
//!
//! This example demonstrates:
//! 1. A controller that succeeds after a few failures
//! 2. Attempt and wall-clock limits
//! 3. Cancelling a sequence from another task
//! 4. The stateless `retry` function
//!
//! Run with:
//! ```bash
//! RUST_LOG=rebound=debug cargo run -p rebound --example retry_example
//! ```

use rebound::prelude::*;
use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// A simulated service that is down for the first few health checks
struct FlakyService {
    checks: AtomicU32,
    down_for: u32,
}

impl FlakyService {
    fn new(down_for: u32) -> Self {
        Self {
            checks: AtomicU32::new(0),
            down_for,
        }
    }

    fn is_up(&self) -> bool {
        let check = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        let up = check > self.down_for;
        println!("  Check {}: {}", check, if up { "UP" } else { "DOWN" });
        up
    }

    fn total_checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }
}

fn controller(config: BackoffConfig) -> Backoff {
    // 100ms time unit keeps the demo short: delays of 100ms, 200ms, 400ms...
    Backoff::new(BackoffConfig {
        time_unit: Duration::from_millis(100),
        ..config
    })
}

/// Example 1: Succeed after failures
async fn example_simple() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Wait for a service to come up ===\n");

    let backoff = controller(BackoffConfig::default());
    let service = FlakyService::new(3);
    let cancel = CancellationToken::new();
    let start = Instant::now();

    let outcome = backoff.run(&cancel, || service.is_up()).await?;

    println!("\nOutcome: {:?}", outcome);
    println!("Total checks: {}", service.total_checks());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: 100ms + 200ms + 400ms = ~700ms");

    Ok(())
}

/// Example 2: Limits
async fn example_limits() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Attempt and time limits ===\n");

    println!("Attempt limit of 3 (service never comes up):");
    let backoff = controller(BackoffConfig::builder().max_attempts(3).build());
    let service = FlakyService::new(u32::MAX);
    let cancel = CancellationToken::new();

    match backoff.run(&cancel, || service.is_up()).await {
        Err(err) => println!("  -> {}", err),
        Ok(outcome) => println!("  -> unexpected {:?}", outcome),
    }

    println!("\nTime budget of 1s (service never comes up):");
    let backoff = controller(
        BackoffConfig::builder()
            .max_total_duration(Duration::from_secs(1))
            .build(),
    );
    let service = FlakyService::new(u32::MAX);

    match backoff.run(&cancel, || service.is_up()).await {
        Err(err) => println!("  -> {}", err),
        Ok(outcome) => println!("  -> unexpected {:?}", outcome),
    }

    Ok(())
}

/// Example 3: Cancellation is not an error
async fn example_cancellation() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Cancel from another task ===\n");

    let backoff = controller(BackoffConfig::default());
    let service = FlakyService::new(u32::MAX);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        println!("  (cancelling)");
        trigger.cancel();
    });

    let outcome = backoff.run(&cancel, || service.is_up()).await?;
    println!("\nOutcome: {:?}", outcome);
    println!("Counter after run: {}", backoff.attempts());

    Ok(())
}

/// Example 4: One-off retry
async fn example_retry_fn() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 4: Stateless retry (1s, 2s, ...) ===\n");

    let service = FlakyService::new(1);
    let cancel = CancellationToken::new();
    let start = Instant::now();

    let outcome = retry(&cancel, || service.is_up(), 2).await?;

    println!("\nOutcome: {:?} after {:?}", outcome, start.elapsed());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("==============================================");
    println!("   Rebound: Backoff Examples");
    println!("==============================================");

    example_simple().await?;
    example_limits().await?;
    example_cancellation().await?;
    example_retry_fn().await?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
