//! # Example: side_rail
//!
//! Two side-rail slots on one page, driven by their own controllers.
//!
//! Shows how to:
//! - Attach the built-in [`LogWriter`] and route it through `tracing_subscriber`.
//! - Start a slot before the ad library has loaded (registration retries).
//! - Observe fill detection through [`AdSlotController::watch`].
//! - Re-arm both slots on navigation, then unmount them.
//!
//! ## Timeline
//! ```text
//! t=0      start(left), start(right)       library not loaded yet
//! t=700ms  library loads                   both register on the 3rd retry (~900ms)
//! t=1750ms left placeholder gets height    left filled at the next check (~1900ms)
//! t=11s    right never fills               right timed out, hidden
//! t=12s    navigate("/de")                 both re-armed with fresh state
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example side_rail
//! ```

use std::{sync::Arc, time::Duration};

use siderail::{
    AdSlotController, Config, LogWriter, MemoryPlaceholder, SharedQueue, SlotPhase, Subscribe,
};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let queue = Arc::new(SharedQueue::new());
    let left_box = Arc::new(MemoryPlaceholder::new());
    let right_box = Arc::new(MemoryPlaceholder::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    let left = AdSlotController::builder(Config::default())
        .with_subscribers(subs.clone())
        .build(queue.clone(), left_box.clone())?;
    let right = AdSlotController::builder(Config::default())
        .with_subscribers(subs)
        .build(queue.clone(), right_box)?;

    let (routes, rx) = watch::channel("/en".to_string());
    let left_routes = left.follow_route(rx.clone());
    let right_routes = right.follow_route(rx);

    left.start("4075355245");
    right.start("7781236609");

    tokio::time::sleep(Duration::from_millis(700)).await;
    queue.install();

    tokio::time::sleep(Duration::from_millis(1_050)).await;
    left_box.set_height(250);

    let mut left_state = left.watch();
    left_state
        .wait_for(|s| s.as_ref().is_some_and(|s| s.phase() == SlotPhase::Filled))
        .await?;
    println!("left:  {}", left.anchor(Some("rail-left")).ok_or("not started")?);

    let mut right_state = right.watch();
    right_state
        .wait_for(|s| s.as_ref().is_some_and(|s| s.is_terminal()))
        .await?;
    println!("right: {}", right.anchor(Some("rail-right")).ok_or("not started")?);

    routes.send("/de".to_string())?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    println!(
        "after navigation: left visible={} right visible={} pushed={}",
        left.visible(),
        right.visible(),
        queue.drain().len()
    );

    left.shutdown().await;
    right.shutdown().await;
    let _ = left_routes.await;
    let _ = right_routes.await;
    Ok(())
}
