pub mod event;
pub mod interact;
pub mod level;
pub mod session;
