//! Client-side subject state and its synchronization with the API.

mod board;
mod sync;

pub use board::{SubjectBoard, SubjectCard};
pub use sync::{ClientError, SyncClient};
