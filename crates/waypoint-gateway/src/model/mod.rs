mod health;
mod link;

pub use health::HealthResponse;
pub use link::{CreateLinkResponse, DeleteLinkResponse, ErrorResponse, LinkResponse};
