//! Tag sets: merging detected labels with tags already stored in an image.

pub mod tag_set;

pub use tag_set::TagSet;
