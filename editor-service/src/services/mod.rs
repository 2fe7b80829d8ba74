pub mod authorization;
pub mod backend;
pub mod callback;
pub mod credentials;
pub mod editor_token;
pub mod metrics;
pub mod proxy;
pub mod storage;

pub use authorization::{AuthorizationGate, CapabilityOracle};
pub use backend::{BackendClient, Directory};
pub use callback::CallbackService;
pub use credentials::{BlobSigner, CredentialIssuer, ScopedCredential, SharedKeySigner};
pub use editor_token::EditorTokenService;
pub use metrics::{get_metrics, init_metrics};
pub use proxy::ProxyGateway;
pub use storage::{LocalStorage, Storage};
