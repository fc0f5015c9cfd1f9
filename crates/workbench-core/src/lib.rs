pub mod domain;
pub mod error;
pub mod form;
pub mod format;
pub mod page;
pub mod query;
pub mod time;
pub mod upload;

pub use domain::*;
pub use error::CoreError;
pub use form::{FilterForm, FormError, InteractionForm};
pub use page::Page;
pub use query::{Field, InteractionQuery, QueryParams, QueryPatch};
pub use upload::{decode_interactions, UploadDecodeError};
