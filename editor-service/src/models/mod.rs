pub mod document;
pub mod session;
pub mod user;

pub use document::DocumentKind;
pub use session::SessionKey;
pub use user::User;
