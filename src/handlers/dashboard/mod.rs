// handlers/dashboard - dashboard management endpoints (JWT authentication required)
pub mod delete;
pub mod get;
pub mod history;
pub mod list;
pub mod owned_by;
pub mod save;
pub mod star;

pub use delete::delete;
pub use get::get;
pub use history::history;
pub use list::{simple_list, team_dashboards};
pub use owned_by::update_owned_by;
pub use save::save;
pub use star::{all_starred, star, starred, unstar};
