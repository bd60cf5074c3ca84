/// Per-host state shared between a poller and the renderer
///
/// Every published state is an immutable `NodeSnapshot` swapped in as a
/// whole, so a reader sees either the previous poll or the new one, never
/// a mix. `NodeWriter` is the only way to publish and exists once per host.

use arc_swap::ArcSwap;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::core::error::PollError;
use crate::core::payload::NodeMetrics;
use crate::utils::{SCANNING_MARKER, UNREACHABLE_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeStatus {
    Init,
    Online,
    Offline,
    Error,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeStatus::Init => "INIT",
            NodeStatus::Online => "ONLINE",
            NodeStatus::Offline => "OFFLINE",
            NodeStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Latest known state of a host.
///
/// Metric fields keep their last successful values across failed polls;
/// only `status` is rewritten on every cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub display_name: String,
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub temp_celsius: i64,
    pub disk_percent: i64,
    pub vm_count: i64,
    pub ct_count: i64,
    pub uptime: String,
    pub status: NodeStatus,
    pub last_update: Option<DateTime<Local>>,
}

impl Default for NodeSnapshot {
    fn default() -> Self {
        Self {
            display_name: SCANNING_MARKER.to_string(),
            cpu_percent: 0.0,
            ram_percent: 0.0,
            temp_celsius: 0,
            disk_percent: 0,
            vm_count: 0,
            ct_count: 0,
            uptime: "-".to_string(),
            status: NodeStatus::Init,
            last_update: None,
        }
    }
}

impl NodeSnapshot {
    /// State after one poll cycle with the given outcome
    pub fn apply(&self, outcome: &Result<NodeMetrics, PollError>, now: DateTime<Local>) -> Self {
        match outcome {
            Ok(metrics) => Self {
                display_name: metrics.name.clone(),
                cpu_percent: metrics.cpu_percent,
                ram_percent: metrics.ram_percent,
                temp_celsius: metrics.temp_celsius,
                disk_percent: metrics.disk_percent,
                vm_count: metrics.vm_count,
                ct_count: metrics.ct_count,
                uptime: metrics.uptime.clone(),
                status: NodeStatus::Online,
                last_update: Some(now),
            },
            // Transport failures also replace the name; protocol failures do not.
            Err(PollError::Transport(_)) => Self {
                display_name: UNREACHABLE_MARKER.to_string(),
                status: NodeStatus::Offline,
                ..self.clone()
            },
            Err(PollError::Protocol { .. }) => Self {
                status: NodeStatus::Offline,
                ..self.clone()
            },
            Err(PollError::Parse(_)) => Self {
                status: NodeStatus::Error,
                ..self.clone()
            },
        }
    }
}

#[derive(Debug)]
pub struct NodeRecord {
    address: String,
    state: ArcSwap<NodeSnapshot>,
}

impl NodeRecord {
    /// Create the record for `address` together with its single writer
    pub fn new(address: impl Into<String>) -> (Arc<NodeRecord>, NodeWriter) {
        let record = Arc::new(NodeRecord {
            address: address.into(),
            state: ArcSwap::from_pointee(NodeSnapshot::default()),
        });
        let writer = NodeWriter {
            record: Arc::clone(&record),
        };
        (record, writer)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Current state, loaded once
    pub fn snapshot(&self) -> Arc<NodeSnapshot> {
        self.state.load_full()
    }

    pub fn status(&self) -> NodeStatus {
        self.state.load().status
    }
}

/// Publishing handle of a `NodeRecord`. Not `Clone`.
#[derive(Debug)]
pub struct NodeWriter {
    record: Arc<NodeRecord>,
}

impl NodeWriter {
    pub fn address(&self) -> &str {
        self.record.address()
    }

    pub fn record(&self) -> &Arc<NodeRecord> {
        &self.record
    }

    /// Fold one poll outcome into the record and publish it atomically
    pub fn publish(&mut self, outcome: &Result<NodeMetrics, PollError>, now: DateTime<Local>) -> NodeStatus {
        let next = self.record.state.load().apply(outcome, now);
        let status = next.status;
        self.record.state.store(Arc::new(next));
        status
    }
}
