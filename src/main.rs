use std::sync::{Arc, Mutex};

use tokio::time::{sleep, Duration};

use adaptive_traffic_control::communication::messages::{TrafficEvent, TrafficEventKind};
use adaptive_traffic_control::config::ControllerConfig;
use adaptive_traffic_control::control_system::orchestrator::{
    run_tick_loop, IntersectionOrchestrator, SharedOrchestrator,
};
use adaptive_traffic_control::detection_feed::run_detection_feed;
use adaptive_traffic_control::monitoring::status_broadcaster::StatusBroadcaster;

/// Pushes a fresh status snapshot to every subscriber every couple of
/// seconds. The snapshot is copied inside the lock, delivery happens
/// outside it.
async fn run_status_push_loop(
    orchestrator: SharedOrchestrator,
    broadcaster: Arc<StatusBroadcaster>,
    interval_secs: u64,
) {
    loop {
        sleep(Duration::from_secs(interval_secs)).await;
        let status = {
            let controller = orchestrator.lock().unwrap();
            controller.get_current_status()
        };
        broadcaster.broadcast(&TrafficEvent::now(TrafficEventKind::IntersectionStatus(
            status,
        )));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("starting adaptive traffic control");

    let config = ControllerConfig::from_env();
    config.validate()?;
    let tick_interval = config.tick_interval_secs;
    let push_interval = config.status_push_interval_secs;
    let override_secs = config.emergency_override_secs;

    // The single logical owner of intersection state; every entry point
    // goes through this mutex.
    let orchestrator: SharedOrchestrator =
        Arc::new(Mutex::new(IntersectionOrchestrator::new(config)?));
    let broadcaster = Arc::new(StatusBroadcaster::new());

    tokio::spawn(run_tick_loop(Arc::clone(&orchestrator), tick_interval));
    tokio::spawn(run_status_push_loop(
        Arc::clone(&orchestrator),
        Arc::clone(&broadcaster),
        push_interval,
    ));
    tokio::spawn(run_detection_feed(
        Arc::clone(&orchestrator),
        Arc::clone(&broadcaster),
        4,
        override_secs,
    ));

    // Demo consumer: log each pushed snapshot the way a dashboard would
    // render it.
    let (subscriber_id, mut events) = broadcaster.subscribe();
    let console = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => log::info!("push: {}", json),
                Err(error) => log::error!("failed to serialize event: {}", error),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down adaptive traffic control");
    broadcaster.unsubscribe(subscriber_id);
    console.abort();
    Ok(())
}
