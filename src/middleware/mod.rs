pub mod auth;
pub mod guard;
pub mod response;

pub use auth::{authenticate, CallerContext};
pub use guard::{require_admin, require_user};
pub use response::{ApiResponse, ApiResult};
