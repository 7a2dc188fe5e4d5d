//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;
mod viewer;

pub use category::Category;
pub use comment::{Comment, CommentWithAuthor};
pub use location::Location;
pub use post::{Post, PostSummary};
pub use user::User;
pub use viewer::Viewer;
