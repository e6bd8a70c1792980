pub mod display;
pub mod refresh;
pub mod session;
pub mod sort;
pub mod visibility;
