//! Application Layer
//!
//! Use cases behind the BFF routes.

pub mod config;
pub mod forward;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod test_user;

// Re-exports
pub use config::{BffConfig, TestUser};
pub use forward::{ForwardBody, ForwardInput, ForwardOutput, ForwardUseCase};
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use refresh::{RefreshOutput, RefreshUseCase};
pub use test_user::{CreateTestUserOutput, CreateTestUserUseCase};
