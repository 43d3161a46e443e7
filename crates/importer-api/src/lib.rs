pub mod anilist;
pub mod error;
pub mod traits;

pub use anilist::AniListClient;
pub use error::LookupError;
pub use traits::{AnimeRecord, MetadataLookup};
