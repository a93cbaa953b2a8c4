//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod authorize;
pub mod change_password;
pub mod config;
pub mod manage_identity;
pub mod provision;
pub mod session_issuer;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

// Re-exports
pub use authenticate::Authenticator;
pub use authorize::{AuthorizationGate, Principal};
pub use change_password::{ChangePasswordInput, ChangePasswordUseCase};
pub use config::AuthConfig;
pub use manage_identity::ManageIdentityUseCase;
pub use provision::{AdminSeed, ProvisionOutcome, ensure_admin_exists};
pub use session_issuer::SessionIssuer;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{NewAccount, SignUpInput, SignUpUseCase};
