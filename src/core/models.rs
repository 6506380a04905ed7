use serde::{Deserialize, Serialize};

/// A chapter of the text — metadata only, no verses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surah {
    pub number: u16,
    /// Chapter name in Arabic script.
    pub name: String,
    pub english_name: String,
    pub number_of_ayahs: u16,
}

/// One verse within a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ayah {
    pub number_in_surah: u16,
    pub text: String,
    #[serde(default)]
    pub translation: String,
}

/// A chapter together with its full ordered verse list, as the bulk
/// text endpoint returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahText {
    pub number: u16,
    pub name: String,
    pub english_name: String,
    pub ayahs: Vec<Ayah>,
}

impl SurahText {
    /// Metadata view of this chapter, verse count derived from the body.
    pub fn summary(&self) -> Surah {
        Surah {
            number: self.number,
            name: self.name.clone(),
            english_name: self.english_name.clone(),
            number_of_ayahs: self.ayahs.len() as u16,
        }
    }
}

/// Result of one run of the bulk fetch-and-cache-all hydration.
#[derive(Debug, Clone, PartialEq)]
pub enum HydrationOutcome {
    /// Every chapter's verse list was fetched and persisted.
    Success { chapters: usize },
    /// The fetch succeeded but persisting this chapter failed; hydration
    /// stopped there. Chapters written before it remain valid (each
    /// chapter is written in its own transaction).
    PartialChapterFailure { chapter: u16, reason: String },
    /// The remote fetch itself failed; nothing was written.
    NetworkFailure(String),
}
