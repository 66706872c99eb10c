// handlers/mod.rs - HTTP handlers grouped by resource
//
// Public:    /, /health
// Protected: /dashboard*, /dashboards/*, /team/:id/dashboards (JWT required)
pub mod dashboard;
pub mod health;
