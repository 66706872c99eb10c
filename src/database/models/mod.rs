pub mod dashboard;
pub mod history;

pub use dashboard::{
    generate_dashboard_id, Dashboard, DashboardRow, DashboardSimple, DashboardSimpleRow,
    DashboardSummary, EncodeError, UpdateOwnedBy, DASHBOARD_ID_PREFIX,
};
pub use history::{DashboardHistoryRow, DashboardRevision, SaveDashboardRequest};
