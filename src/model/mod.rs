pub mod attendance;
pub mod subject;
pub mod user;
