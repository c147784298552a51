// Application layer - the client's use cases on top of the REST API.
// Each use case mirrors one screen of the original web client: user
// creation, group creation, the group page with its expense form, and the
// cross-group balance view.

pub mod error;
pub mod service;
pub mod views;

pub use error::*;
pub use service::*;
pub use views::*;
