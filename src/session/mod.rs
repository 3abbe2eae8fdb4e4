pub mod manager;

pub use manager::{KeyPolicy, Outbound, SessionError, SessionManager};
