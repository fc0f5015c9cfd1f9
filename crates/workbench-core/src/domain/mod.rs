pub mod ids;
pub mod interaction;

pub use ids::{CustomerId, InteractionId, ProductId};
pub use interaction::{Interaction, InteractionType, NewInteraction, UploadReceipt};
