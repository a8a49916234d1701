pub mod chief;
pub mod config;
pub mod radio;

pub use chief::{CrewChief, CrewError};
pub use config::CrewConfig;
pub use radio::CrewRadio;
