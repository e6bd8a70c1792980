pub mod host;
pub mod parameter;
pub mod contract;
pub mod store;
pub mod config;

pub use host::*;
pub use parameter::*;
pub use contract::*;
pub use store::*;
pub use config::*;
