pub mod bank;
pub mod config;
pub mod error;
pub mod normalize;
pub mod question;
pub mod schema;
pub mod store;

pub use bank::*;
pub use config::*;
pub use error::*;
pub use normalize::{
    next_auto_id, next_id, normalize_bank, normalize_bank_with, normalize_questions, now_iso,
    today_ymd,
};
pub use question::*;
pub use store::{MemoryStore, SqliteStore, Store};
