pub mod overview;

// The dashboard is a single live screen: banner, summary line and host table.
// It is redrawn from a fresh `DashboardFrame` on every render tick.

pub use overview::draw;
