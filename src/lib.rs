pub mod runtime_env;

mod context;
mod document;
mod error;
mod handlers;
mod secret;

pub use context::AppContext;
pub use handlers::{handle_request, Operation};
pub use runtime_env::ConnectionProfile;
