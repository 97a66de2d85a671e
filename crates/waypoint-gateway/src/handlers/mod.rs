mod health;
mod links;
mod redirect;

pub use health::health_handler;
pub use links::{create_link_handler, delete_link_handler, get_link_handler, missing_token_handler};
pub use redirect::redirect_handler;
