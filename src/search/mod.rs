pub mod index;

pub use index::SearchIndex;
