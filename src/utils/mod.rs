pub mod response;

pub use response::{internal_error_response, AppError, ErrorBody, HandlerFault};
