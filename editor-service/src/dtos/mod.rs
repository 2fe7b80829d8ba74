pub mod editor;

pub use editor::{CallbackAck, CallbackPayload, SessionTicket};
