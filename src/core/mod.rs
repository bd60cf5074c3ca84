pub mod config;
pub mod error;
pub mod node;
pub mod orchestrator;
pub mod payload;
pub mod poller;
pub mod shutdown;
pub mod snapshot;
pub mod transport;

pub use config::{ConfigOverrides, OverseerConfig};
pub use error::{ParseError, PollError, TransportError};
pub use node::{NodeRecord, NodeSnapshot, NodeStatus, NodeWriter};
pub use orchestrator::{Accent, Cluster, DashboardFrame, Orchestrator, Renderer};
pub use payload::{parse_payload, NodeMetrics};
pub use snapshot::{build_rows, ColorClass, HostRow, StatusClass, StatusSummary};
pub use transport::{HostTransport, SshTransport};
