pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod interactions;
pub mod paged;
pub mod transport;

pub use error::{error_message, ApiError, ErrorPayload};
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use interactions::{CsvUpload, InteractionsClient};
pub use paged::{InteractionsView, PendingLoad, QueryState};
pub use transport::{ApiRequest, ApiResponse, Method, MultipartForm, RequestBody, Transport};
