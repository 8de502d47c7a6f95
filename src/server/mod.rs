mod accounts;
mod catalog;
pub mod dto;
mod media;
pub mod payload;
pub mod response;
mod router;
pub mod validation;

pub use router::{AppState, create_router};
