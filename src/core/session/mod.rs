// Session module - Saved answer sets
pub mod record;
pub mod store;

pub use record::{SessionRecord, SAVE_FILE_VERSION};
pub use store::{validate_key, SavedSession, SessionIter, SessionStore};
