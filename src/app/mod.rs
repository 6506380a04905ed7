pub mod ayahs;
pub mod search;
pub mod surahs;
pub mod viewport;
