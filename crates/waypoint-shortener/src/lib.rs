//! The write path of the shortener.
//!
//! [`WriteService`] turns create and delete requests into record store
//! writes. It never touches the mirror bucket; the sync worker propagates
//! every change from the record store's change feed.

pub mod error;
pub mod service;
pub mod shortener;

pub use error::{ShortenerError, MISSING_TOKEN, MISSING_URL};
pub use service::WriteService;
pub use shortener::{CreateLinkRequest, CreatedLink, DeleteLinkRequest, LinkService};
