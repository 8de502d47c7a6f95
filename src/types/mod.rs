mod choices;
mod models;

pub use choices::{ChiefType, DocumentType, EventType, SiteType};
pub use models::*;
