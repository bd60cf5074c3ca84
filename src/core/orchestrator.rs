/// Cluster wiring: one poller task per host plus the render loop
///
/// Pollers are spawned with a staggered start and write only to their own
/// record. The render loop runs on the caller's task, reads every record
/// once per frame and hands the rows to a `Renderer`.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rand::seq::SliceRandom;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::core::config::OverseerConfig;
use crate::core::node::{NodeRecord, NodeWriter};
use crate::core::poller::{PollSchedule, Poller};
use crate::core::shutdown::{shutdown_channel, Shutdown};
use crate::core::snapshot::{build_rows, HostRow, StatusSummary};
use crate::core::transport::HostTransport;
use crate::utils::{FRAME_INTERVAL, POLLER_START_STAGGER};

/// All node records, in configuration order
#[derive(Debug, Clone)]
pub struct Cluster {
    records: Vec<Arc<NodeRecord>>,
}

impl Cluster {
    pub fn from_hosts<I, S>(hosts: I) -> (Self, Vec<NodeWriter>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (records, writers): (Vec<_>, Vec<_>) = hosts.into_iter().map(NodeRecord::new).unzip();
        (Self { records }, writers)
    }

    pub fn from_config(config: &OverseerConfig) -> (Self, Vec<NodeWriter>) {
        Self::from_hosts(config.hosts.iter().cloned())
    }

    pub fn records(&self) -> &[Arc<NodeRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> Vec<HostRow> {
        build_rows(&self.records)
    }
}

/// Cosmetic border color, re-rolled every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Cyan,
    Magenta,
    Green,
}

impl Accent {
    pub const ALL: [Accent; 3] = [Accent::Cyan, Accent::Magenta, Accent::Green];

    pub fn random() -> Self {
        *Self::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&Accent::Cyan)
    }
}

/// Everything one frame needs
#[derive(Debug, Clone)]
pub struct DashboardFrame {
    pub rows: Vec<HostRow>,
    pub summary: StatusSummary,
    pub accent: Accent,
    pub taken_at: DateTime<Local>,
}

impl DashboardFrame {
    pub fn capture(cluster: &Cluster) -> Self {
        let rows = cluster.rows();
        let summary = StatusSummary::from_rows(&rows);
        Self {
            rows,
            summary,
            accent: Accent::random(),
            taken_at: Local::now(),
        }
    }
}

/// Drawing surface used by the render loop
pub trait Renderer {
    fn draw(&mut self, frame: &DashboardFrame) -> Result<()>;

    /// Polled once per frame; `true` ends the render loop
    fn quit_requested(&mut self) -> Result<bool> {
        Ok(false)
    }
}

/// Draw a frame every `FRAME_INTERVAL` until shutdown or the renderer quits
pub async fn run_render_loop<R>(cluster: &Cluster, renderer: &mut R, mut shutdown: Shutdown) -> Result<()>
where
    R: Renderer + ?Sized,
{
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.wait() => break,
        }

        let frame = DashboardFrame::capture(cluster);
        renderer.draw(&frame)?;

        if renderer.quit_requested()? {
            break;
        }
    }

    Ok(())
}

pub struct Orchestrator {
    cluster: Cluster,
    writers: Vec<NodeWriter>,
    transport: Arc<dyn HostTransport>,
    schedule: PollSchedule,
    stagger: Duration,
}

impl Orchestrator {
    pub fn new(config: &OverseerConfig, transport: Arc<dyn HostTransport>) -> Self {
        let (cluster, writers) = Cluster::from_config(config);
        Self {
            cluster,
            writers,
            transport,
            schedule: PollSchedule::default(),
            stagger: POLLER_START_STAGGER,
        }
    }

    pub fn with_timing(mut self, schedule: PollSchedule, stagger: Duration) -> Self {
        self.schedule = schedule;
        self.stagger = stagger;
        self
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    fn take_pollers(&mut self) -> Vec<Poller> {
        self.writers
            .drain(..)
            .map(|writer| Poller::new(writer, Arc::clone(&self.transport), self.schedule))
            .collect()
    }

    /// Poll every host once, concurrently, and return the resulting rows
    pub async fn poll_all_once(mut self) -> Vec<HostRow> {
        let mut pollers = self.take_pollers();
        futures::future::join_all(pollers.iter_mut().map(|p| p.poll_once())).await;
        self.cluster.rows()
    }

    /// Live dashboard until the renderer quits or SIGINT arrives
    pub async fn run<R: Renderer + ?Sized>(self, renderer: &mut R) -> Result<()> {
        self.run_until(renderer, async {
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for interrupt signal")
        })
        .await
    }

    /// Live dashboard until the renderer quits or `interrupt` resolves
    pub async fn run_until<R, F>(mut self, renderer: &mut R, interrupt: F) -> Result<()>
    where
        R: Renderer + ?Sized,
        F: Future<Output = Result<()>>,
    {
        let (trigger, shutdown) = shutdown_channel();
        let mut tasks = JoinSet::new();

        for (index, poller) in self.take_pollers().into_iter().enumerate() {
            let start_delay = self.stagger * index as u32;
            tasks.spawn(poller.run(start_delay, shutdown.clone()));
        }
        info!(hosts = self.cluster.len(), "pollers scheduled");

        let result = tokio::select! {
            res = run_render_loop(&self.cluster, renderer, shutdown) => res,
            res = interrupt => {
                info!("interrupt received");
                res
            }
        };

        trigger.trigger();
        // In-flight polls are abandoned, not drained
        tasks.shutdown().await;
        info!("pollers stopped");

        result
    }
}
