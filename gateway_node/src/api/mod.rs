pub mod dispatch;
pub mod errors;
pub mod server;
pub mod validation;

pub use dispatch::{DispatchError, GatewayServer, ServerError};
pub use errors::{ApiError, ApiResult, ValidationError};
pub use server::{create_router, make_app, AppState, CcipRequest, CcipResponse, HealthResponse};
