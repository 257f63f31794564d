pub mod author;
pub mod book;
pub mod book_authors;
pub mod bookmark;
pub mod comment;
pub mod follow;
pub mod like;
pub mod profile;
pub mod shelf_entry;
pub mod topic;
pub mod user;

pub use book::Book;
pub use profile::Profile;
pub use shelf_entry::{ShelfEntry, ShelfStatus};
pub use topic::Topic;
pub use user::User;
