// Backend endpoints, one `impl DashboardClient` block per area

pub mod ai;
pub mod dashboard;
pub mod state;
