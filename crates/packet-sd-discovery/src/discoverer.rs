//! The periodic fetch → map → reconcile → publish loop.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use packet_sd_client::InventoryApi;
use packet_sd_core::{SdConfig, TargetGroup};
use packet_sd_metrics::SdMetrics;
use tokio::sync::{mpsc, watch};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::mapper::TargetMapper;
use crate::snapshot::Snapshot;

/// Retrieves target information from the Packet API on a fixed interval.
pub struct Discoverer {
    fetcher: Fetcher,
    mapper: TargetMapper,
    refresh: Duration,
    /// Sources published by the last successful cycle.
    snapshot: Snapshot,
}

impl Discoverer {
    pub fn new(fetcher: Fetcher, mapper: TargetMapper, refresh: Duration) -> Self {
        Self {
            fetcher,
            mapper,
            refresh,
            snapshot: Snapshot::new(),
        }
    }

    /// Assemble a discoverer from the agent config.
    pub fn from_config(api: Arc<dyn InventoryApi>, metrics: SdMetrics, config: &SdConfig) -> Self {
        let fetcher = Fetcher::new(api, metrics, config.project_scope().map(String::from));
        let mapper = TargetMapper::new(config.target_port, config.tag_separator.clone());
        Self::new(fetcher, mapper, config.refresh())
    }

    /// Run one cycle and return the batch to publish.
    ///
    /// On error the snapshot is left exactly as the previous cycle left it.
    pub async fn discover(&mut self) -> Result<Vec<TargetGroup>, FetchError> {
        let devices = self.fetcher.fetch().await?;

        let mut live = Vec::with_capacity(devices.len());
        for device in &devices {
            let tg = self.mapper.map(device);
            debug!(source = %tg.source, "device added");
            live.push(tg);
        }

        Ok(self.snapshot.apply(live))
    }

    /// Run the discovery loop until shutdown.
    ///
    /// One cycle runs immediately, then one per refresh tick. Every
    /// successful cycle sends exactly one batch, even an empty or unchanged
    /// one; failed cycles send nothing. Sending waits for the receiver to
    /// make room, so a slow publisher slows discovery down.
    pub async fn run(
        mut self,
        tx: mpsc::Sender<Vec<TargetGroup>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            interval_secs = self.refresh.as_secs(),
            project = self.fetcher.project_id().unwrap_or("*"),
            "discoverer started"
        );

        let mut ticker = tokio::time::interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            match self.discover().await {
                Ok(groups) => {
                    let count = groups.len();
                    if tx.send(groups).await.is_err() {
                        warn!("target group receiver closed, stopping discoverer");
                        break;
                    }
                    debug!(groups = count, live = self.snapshot.len(), "target groups published");
                }
                Err(e) => {
                    warn!(error = %e, "discovery cycle failed");
                }
            }

            if wait_for_tick(&mut ticker, &mut shutdown).await.is_break() {
                info!("discoverer shutting down");
                break;
            }
        }
    }
}

/// Wait for the next tick unless shutdown is requested first.
///
/// Only a `true` value stops the loop. A dropped sender can never signal
/// again, so it counts as shutdown too.
async fn wait_for_tick(
    ticker: &mut Interval,
    shutdown: &mut watch::Receiver<bool>,
) -> ControlFlow<()> {
    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return ControlFlow::Break(());
                }
            }
            _ = ticker.tick() => return ControlFlow::Continue(()),
        }
    }
}
