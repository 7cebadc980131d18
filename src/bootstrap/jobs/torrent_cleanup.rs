//! Job that runs a task on intervals to clean up the swarms.
//!
//! It removes peers that have missed two announce intervals. A peer that
//! stops announcing without a `stopped` event (crash, network loss) would
//! otherwise sit in its swarm forever and be handed out to other clients.
//!
//! The sweep cadence is the `inactive_peer_cleanup_interval` setting, by
//! default the announce interval itself. Eviction during peer sampling is a
//! best-effort supplement; this job is the only source of bulk eviction.
use std::sync::Arc;

use chrono::Utc;
use storrent_configuration::Core;
use tokio::task::JoinHandle;

use crate::core;

/// It starts a job to clean up the swarms held by the tracker.
///
/// The job holds a weak reference, so it winds down on its own once the
/// tracker is dropped. A ctrl-c stops it between sweeps, never mid-sweep.
#[must_use]
pub fn start_job(config: &Core, tracker: &Arc<core::Tracker>) -> JoinHandle<()> {
    let weak_tracker = Arc::downgrade(tracker);
    let interval = config.inactive_peer_cleanup_interval;

    tokio::spawn(async move {
        let interval = std::time::Duration::from_secs(interval);
        let mut interval = tokio::time::interval(interval);

        // The first tick fires immediately; skip it so a fresh tracker is
        // not swept before anyone announced.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Stopping torrent cleanup job..");
                    break;
                }
                _ = interval.tick() => {
                    if let Some(tracker) = weak_tracker.upgrade() {
                        let start_time = Utc::now().time();
                        tracing::info!("Cleaning up torrents..");
                        tracker.cleanup_torrents();
                        tracing::info!("Cleaned up torrents in: {}ms", (Utc::now().time() - start_time).num_milliseconds());
                    } else {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use storrent_configuration::Core;

    use super::start_job;
    use crate::core::Tracker;

    #[tokio::test]
    async fn the_job_should_exit_once_the_tracker_is_dropped() {
        let config = Core {
            inactive_peer_cleanup_interval: 1,
            ..Default::default()
        };
        let tracker = Arc::new(Tracker::new(&config).unwrap());

        let handle = start_job(&config, &tracker);

        drop(tracker);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("the job should exit after the tracker is gone")
            .expect("the job should not panic");
    }
}
