pub mod arguments;
pub mod classpath;
pub mod identity;
pub mod planner;
pub mod process;

pub use identity::{offline_uuid, validate_username, DEFAULT_USERNAME};
pub use planner::{LaunchOptions, LaunchPlan, LaunchPlanner};
pub use process::{DetachedSpawner, ProcessSpawner};
