pub mod authority;
pub mod password;
pub mod redis_store;
pub mod session;
pub mod token;

pub use authority::{AuthError, LoginResponse, SessionAuthority};
pub use session::{MemorySessionStore, SessionRecord, SessionStore, SessionStoreError};
pub use token::{Claims, TokenError};
