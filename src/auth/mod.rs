pub mod handlers;
pub mod session;

pub use session::{Flash, FlashLevel, Session, SessionStore, SessionUser, SqliteSessionStore};
