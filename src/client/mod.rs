//! Client side of the widget: session context, request manager with
//! timeout and backoff, and the submission controller the UI drives.

pub mod controller;
pub mod error;
pub mod export;
pub mod manager;
pub mod retry;
pub mod sanitize;
pub mod session;
pub mod theme;
pub mod transcript;
pub mod transport;

pub use controller::{ChatController, ErrorNotice, Renderer, SubmitOutcome};
pub use error::ClientError;
pub use manager::RequestManager;
pub use session::{ClientSession, ConnectionStatus};
pub use transport::{HttpTransport, RequestKind, Transport};
