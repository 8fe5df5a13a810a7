pub mod feed;
pub mod item;
pub mod updates;

pub use feed::FeedKind;
pub use item::{Item, ItemId, ItemKind};
pub use updates::Updates;
