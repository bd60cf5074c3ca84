/// Per-host polling task
///
/// Each cycle: fetch over the transport, classify the outcome, publish it,
/// then sleep for a jittered interval. Failures only change the published
/// status; the loop itself ends on shutdown only.

use chrono::Local;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::error::PollError;
use crate::core::node::{NodeStatus, NodeWriter};
use crate::core::payload::{parse_payload, NodeMetrics};
use crate::core::shutdown::Shutdown;
use crate::core::transport::HostTransport;
use crate::utils::{POLL_BASE_INTERVAL, POLL_JITTER};

/// Delay between cycles: `base` plus a uniform random share of `jitter`
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    base: Duration,
    jitter: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(POLL_BASE_INTERVAL, POLL_JITTER)
    }
}

impl PollSchedule {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.base;
        }
        let factor: f64 = rand::thread_rng().gen();
        self.base + self.jitter.mul_f64(factor)
    }
}

/// Run one collection call and turn it into metrics or a classified failure
pub async fn collect(transport: &dyn HostTransport, address: &str) -> Result<NodeMetrics, PollError> {
    let output = transport.fetch(address).await?;
    let payload = output.stdout.trim();

    if output.exit_code != 0 || payload.is_empty() {
        return Err(PollError::Protocol {
            exit_code: output.exit_code,
            output_len: payload.len(),
        });
    }

    Ok(parse_payload(payload)?)
}

pub struct Poller {
    writer: NodeWriter,
    transport: Arc<dyn HostTransport>,
    schedule: PollSchedule,
}

impl Poller {
    pub fn new(writer: NodeWriter, transport: Arc<dyn HostTransport>, schedule: PollSchedule) -> Self {
        Self {
            writer,
            transport,
            schedule,
        }
    }

    pub fn address(&self) -> &str {
        self.writer.address()
    }

    /// One full cycle without the trailing sleep
    pub async fn poll_once(&mut self) -> NodeStatus {
        let outcome = collect(self.transport.as_ref(), self.writer.address()).await;
        let previous = self.writer.record().status();
        let status = self.writer.publish(&outcome, Local::now());
        let address = self.writer.address();

        match outcome {
            Ok(ref metrics) => {
                if previous != NodeStatus::Online {
                    info!(address, name = %metrics.name, "node online");
                }
                debug!(address, cpu = metrics.cpu_percent, ram = metrics.ram_percent, "poll ok");
            }
            Err(ref e) if previous != status => {
                warn!(address, %status, error = %e, "node status changed");
            }
            Err(ref e) => {
                debug!(address, %status, error = %e, "poll failed");
            }
        }

        status
    }

    /// Poll until shutdown, starting after `start_delay`
    pub async fn run(mut self, start_delay: Duration, mut shutdown: Shutdown) {
        let address = self.address().to_string();

        if !shutdown.sleep(start_delay).await {
            return;
        }
        debug!(address = %address, "poller started");

        loop {
            // An in-flight fetch is dropped on shutdown; the transport kills its child
            tokio::select! {
                _ = self.poll_once() => {}
                _ = shutdown.wait() => break,
            }

            if !shutdown.sleep(self.schedule.next_delay()).await {
                break;
            }
        }

        debug!(address = %address, "poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TransportError;
    use crate::core::node::NodeRecord;
    use crate::core::shutdown::shutdown_channel;
    use crate::core::transport::{FetchOutput, MockHostTransport};
    use crate::utils::UNREACHABLE_MARKER;
    use async_trait::async_trait;
    use mockall::Sequence;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GOOD: &str = "web1|4,5|62|55|40|2|3|14d 3h\n";

    fn poller_with(mock: MockHostTransport) -> (Arc<NodeRecord>, Poller) {
        let (record, writer) = NodeRecord::new("10.0.10.11");
        let poller = Poller::new(writer, Arc::new(mock), PollSchedule::default());
        (record, poller)
    }

    #[test]
    fn test_schedule_bounds() {
        let schedule = PollSchedule::default();
        for _ in 0..1000 {
            let delay = schedule.next_delay();
            assert!(delay >= Duration::from_secs(2));
            assert!(delay < Duration::from_secs(4));
        }

        let fixed = PollSchedule::new(Duration::from_secs(1), Duration::ZERO);
        assert_eq!(fixed.next_delay(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_online_then_protocol_failure_keeps_name() {
        let mut mock = MockHostTransport::new();
        let mut seq = Sequence::new();
        mock.expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchOutput::success(GOOD)));
        mock.expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchOutput { exit_code: 1, stdout: String::new() }));

        let (record, mut poller) = poller_with(mock);

        assert_eq!(poller.poll_once().await, NodeStatus::Online);
        let snap = record.snapshot();
        assert_eq!(snap.display_name, "web1");
        assert!((snap.cpu_percent - 45.0).abs() < 1e-9);
        assert_eq!(snap.ram_percent, 62.0);
        assert_eq!(snap.temp_celsius, 55);
        assert_eq!(snap.disk_percent, 40);
        assert_eq!(snap.vm_count, 2);
        assert_eq!(snap.ct_count, 3);
        assert_eq!(snap.uptime, "14d 3h");
        assert!(snap.last_update.is_some());

        assert_eq!(poller.poll_once().await, NodeStatus::Offline);
        let snap = record.snapshot();
        assert_eq!(snap.display_name, "web1");
        assert_eq!(snap.uptime, "14d 3h");
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_payload_is_offline() {
        let mut mock = MockHostTransport::new();
        let mut seq = Sequence::new();
        mock.expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchOutput::success(GOOD)));
        mock.expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchOutput { exit_code: 255, stdout: "db2|9|90|70|95|0|0|1d".to_string() }));

        let (record, mut poller) = poller_with(mock);
        poller.poll_once().await;

        assert_eq!(poller.poll_once().await, NodeStatus::Offline);
        let snap = record.snapshot();
        assert_eq!(snap.display_name, "web1");
        assert_eq!(snap.ram_percent, 62.0);
        assert_eq!(snap.uptime, "14d 3h");
    }

    #[tokio::test]
    async fn test_whitespace_only_output_is_offline() {
        let mut mock = MockHostTransport::new();
        mock.expect_fetch()
            .returning(|_| Ok(FetchOutput::success("  \n\t")));

        let (record, mut poller) = poller_with(mock);

        assert_eq!(poller.poll_once().await, NodeStatus::Offline);
        assert_eq!(record.snapshot().display_name, crate::utils::SCANNING_MARKER);
    }

    #[tokio::test]
    async fn test_timeout_marks_unreachable() {
        let mut mock = MockHostTransport::new();
        let mut seq = Sequence::new();
        mock.expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchOutput::success(GOOD)));
        mock.expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(TransportError::Timeout(Duration::from_secs(7))));

        let (record, mut poller) = poller_with(mock);
        poller.poll_once().await;

        assert_eq!(poller.poll_once().await, NodeStatus::Offline);
        let snap = record.snapshot();
        assert_eq!(snap.display_name, UNREACHABLE_MARKER);
        assert_eq!(snap.disk_percent, 40);
    }

    #[tokio::test]
    async fn test_malformed_payload_sets_error_and_keeps_metrics() {
        let mut mock = MockHostTransport::new();
        let mut seq = Sequence::new();
        mock.expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchOutput::success(GOOD)));
        mock.expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchOutput::success("web1|oops|62")));

        let (record, mut poller) = poller_with(mock);
        poller.poll_once().await;
        let before = record.snapshot();

        assert_eq!(poller.poll_once().await, NodeStatus::Error);
        let after = record.snapshot();
        assert_eq!(after.display_name, before.display_name);
        assert_eq!(after.cpu_percent, before.cpu_percent);
        assert_eq!(after.last_update, before.last_update);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_jittered_cadence_until_shutdown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut mock = MockHostTransport::new();
        mock.expect_fetch().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(FetchOutput::success(GOOD))
        });

        let (record, poller) = poller_with(mock);
        let (trigger, shutdown) = shutdown_channel();
        let task = tokio::spawn(poller.run(Duration::ZERO, shutdown));

        tokio::time::sleep(Duration::from_secs(10)).await;
        trigger.trigger();
        task.await.unwrap();

        let n = calls.load(Ordering::SeqCst);
        assert!((3..=6).contains(&n), "unexpected poll count {}", n);
        assert_eq!(record.status(), NodeStatus::Online);
    }

    struct HangingTransport;

    #[async_trait]
    impl HostTransport for HangingTransport {
        async fn fetch(&self, _address: &str) -> Result<FetchOutput, TransportError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_in_flight_fetch() {
        let (record, writer) = NodeRecord::new("10.0.10.11");
        let poller = Poller::new(writer, Arc::new(HangingTransport), PollSchedule::default());
        let (trigger, shutdown) = shutdown_channel();

        let task = tokio::spawn(poller.run(Duration::ZERO, shutdown));
        tokio::time::sleep(Duration::from_secs(30)).await;
        trigger.trigger();
        task.await.unwrap();

        assert_eq!(record.status(), NodeStatus::Init);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_start_delay_skips_polling() {
        let mut mock = MockHostTransport::new();
        mock.expect_fetch().never();

        let (record, poller) = poller_with(mock);
        let (trigger, shutdown) = shutdown_channel();

        let task = tokio::spawn(poller.run(Duration::from_secs(60), shutdown));
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.trigger();
        task.await.unwrap();

        assert_eq!(record.status(), NodeStatus::Init);
    }
}
