/// Read-only pass over all node records producing render-ready rows
///
/// Each record is loaded exactly once per frame. Rows of hosts that are not
/// online show placeholders even though the record still holds older metrics.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;

use crate::core::node::{NodeRecord, NodeSnapshot, NodeStatus};
use crate::utils::{
    Thresholds, BAR_SEGMENTS, CPU_THRESHOLDS, DISK_THRESHOLDS, PLACEHOLDER, RAM_THRESHOLDS,
    TEMP_THRESHOLDS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    Green,
    Yellow,
    Red,
    /// Placeholder cells
    Dim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    Online,
    Offline,
    Unknown,
}

impl StatusClass {
    pub fn from_status(status: NodeStatus) -> Self {
        match status {
            NodeStatus::Online => StatusClass::Online,
            NodeStatus::Offline => StatusClass::Offline,
            NodeStatus::Error | NodeStatus::Init => StatusClass::Unknown,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            StatusClass::Online => "●",
            StatusClass::Offline => "✖",
            StatusClass::Unknown => "?",
        }
    }

    pub fn color(&self) -> ColorClass {
        match self {
            StatusClass::Online => ColorClass::Green,
            StatusClass::Offline => ColorClass::Red,
            StatusClass::Unknown => ColorClass::Yellow,
        }
    }
}

/// One metric column: bar fill, formatted value and color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCell {
    pub fill: u8,
    pub text: String,
    pub color: ColorClass,
}

impl MetricCell {
    fn measured(value: f64, text: String, thresholds: Thresholds) -> Self {
        Self {
            fill: bar_fill(value),
            text,
            color: classify(value, thresholds),
        }
    }

    fn placeholder() -> Self {
        Self {
            fill: 0,
            text: PLACEHOLDER.to_string(),
            color: ColorClass::Dim,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRow {
    pub display_name: String,
    pub address: String,
    pub status: NodeStatus,
    pub status_class: StatusClass,
    pub cpu: MetricCell,
    pub ram: MetricCell,
    pub temp: MetricCell,
    pub disk: MetricCell,
    pub guests: String,
    pub uptime: String,
    pub last_update: Option<DateTime<Local>>,
}

/// Three-bucket classification: below `warn` green, below `crit` yellow, else red
pub fn classify(value: f64, thresholds: Thresholds) -> ColorClass {
    if value < thresholds.warn {
        ColorClass::Green
    } else if value < thresholds.crit {
        ColorClass::Yellow
    } else {
        ColorClass::Red
    }
}

/// Number of filled bar segments, `floor(value / 10)` clamped to the bar size
pub fn bar_fill(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value / 10.0).floor().clamp(0.0, f64::from(BAR_SEGMENTS)) as u8
}

pub fn build_row(address: &str, snap: &NodeSnapshot) -> HostRow {
    let status_class = StatusClass::from_status(snap.status);

    let (cpu, ram, temp, disk, guests, uptime) = if snap.status == NodeStatus::Online {
        (
            MetricCell::measured(snap.cpu_percent, format!("{:.1}", snap.cpu_percent), CPU_THRESHOLDS),
            MetricCell::measured(snap.ram_percent, format!("{:.0}%", snap.ram_percent), RAM_THRESHOLDS),
            MetricCell::measured(snap.temp_celsius as f64, format!("{}°C", snap.temp_celsius), TEMP_THRESHOLDS),
            MetricCell::measured(snap.disk_percent as f64, format!("{}%", snap.disk_percent), DISK_THRESHOLDS),
            format!("VM:{} | CT:{}", snap.vm_count, snap.ct_count),
            snap.uptime.clone(),
        )
    } else {
        (
            MetricCell::placeholder(),
            MetricCell::placeholder(),
            MetricCell::placeholder(),
            MetricCell::placeholder(),
            PLACEHOLDER.to_string(),
            PLACEHOLDER.to_string(),
        )
    };

    HostRow {
        display_name: snap.display_name.clone(),
        address: address.to_string(),
        status: snap.status,
        status_class,
        cpu,
        ram,
        temp,
        disk,
        guests,
        uptime,
        last_update: snap.last_update,
    }
}

pub fn build_rows<'a, I>(records: I) -> Vec<HostRow>
where
    I: IntoIterator<Item = &'a Arc<NodeRecord>>,
{
    records
        .into_iter()
        .map(|record| build_row(record.address(), &record.snapshot()))
        .collect()
}

/// Host counts per status, shown above the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub online: usize,
    pub offline: usize,
    pub error: usize,
    pub scanning: usize,
}

impl StatusSummary {
    pub fn from_rows(rows: &[HostRow]) -> Self {
        rows.iter().fold(Self::default(), |mut summary, row| {
            match row.status {
                NodeStatus::Online => summary.online += 1,
                NodeStatus::Offline => summary.offline += 1,
                NodeStatus::Error => summary.error += 1,
                NodeStatus::Init => summary.scanning += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.online + self.offline + self.error + self.scanning
    }
}
