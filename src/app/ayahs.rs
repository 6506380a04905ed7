use crate::core::error::DataError;
use crate::core::models::{Ayah, Surah};
use crate::core::store::CacheHandle;

pub const AYAH_PAGE_SIZE: usize = 10;

/// Ticket for an in-flight `load_more`. Stamped with the controller
/// generation at the time it was issued; a refresh in between makes it
/// stale and completing it becomes a no-op.
#[derive(Debug)]
pub struct PendingPage {
    generation: u64,
}

/// Verse reader screen for one chapter: the full cached verse list in
/// memory, revealed to the view in fixed-size increments.
pub struct AyahListController {
    surah: Surah,
    all: Vec<Ayah>,
    visible_len: usize,
    page: u32,
    is_loading: bool,
    is_loading_more: bool,
    generation: u64,
    last_error: Option<DataError>,
}

impl AyahListController {
    pub fn new(surah: Surah) -> Self {
        AyahListController {
            surah,
            all: Vec::new(),
            visible_len: 0,
            page: 1,
            is_loading: false,
            is_loading_more: false,
            generation: 0,
            last_error: None,
        }
    }

    pub fn surah(&self) -> &Surah {
        &self.surah
    }

    /// The revealed window — always a contiguous prefix of the full
    /// cached collection in verse-number order.
    pub fn visible(&self) -> &[Ayah] {
        &self.all[..self.visible_len]
    }

    pub fn total(&self) -> usize {
        self.all.len()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.is_loading_more
    }

    pub fn last_error(&self) -> Option<&DataError> {
        self.last_error.as_ref()
    }

    /// "12 of 286 Ayahs" — for the screen header.
    pub fn status_line(&self) -> String {
        format!("{} of {} Ayahs", self.visible_len, self.all.len())
    }

    /// Read the chapter's full verse list from cache into memory and
    /// collapse the window to the first page. A cache miss leaves the
    /// screen empty with a diagnostic; there is no network fallback.
    pub async fn load_all(&mut self, cache: &CacheHandle) {
        self.is_loading = true;
        // Invalidate any load_more still in flight.
        self.generation += 1;
        self.is_loading_more = false;

        match cache.load_ayahs(self.surah.number).await {
            Ok(Some(ayahs)) => {
                log::info!(
                    "Loaded {} cached ayahs for surah {}",
                    ayahs.len(),
                    self.surah.number
                );
                self.all = ayahs;
                self.last_error = None;
            }
            Ok(None) => {
                log::warn!("No cached ayahs for surah {}", self.surah.number);
                self.all = Vec::new();
                self.last_error = Some(DataError::CacheMiss(self.surah.number));
            }
            Err(e) => {
                log::error!(
                    "Failed to read cached ayahs for surah {}: {}",
                    self.surah.number,
                    e
                );
                self.all = Vec::new();
                self.last_error = Some(DataError::Network(e));
            }
        }

        self.page = 1;
        self.visible_len = self.all.len().min(AYAH_PAGE_SIZE);
        self.is_loading = false;
    }

    /// First half of `load_more`: claim the in-flight slot. Returns `None`
    /// when a load is already pending or the window already covers the
    /// whole collection.
    pub fn begin_load_more(&mut self) -> Option<PendingPage> {
        if self.is_loading_more {
            return None;
        }
        if self.visible_len >= self.all.len() {
            return None;
        }
        self.is_loading_more = true;
        Some(PendingPage {
            generation: self.generation,
        })
    }

    /// Second half of `load_more`: extend the window by one page and
    /// advance the page counter by exactly one. A ticket issued before a
    /// refresh is stale and is dropped without touching the window.
    pub fn complete_load_more(&mut self, pending: PendingPage) {
        if pending.generation != self.generation {
            log::debug!(
                "Dropping stale load_more for surah {} (refreshed meanwhile)",
                self.surah.number
            );
            return;
        }
        self.is_loading_more = false;
        self.visible_len = (self.visible_len + AYAH_PAGE_SIZE).min(self.all.len());
        self.page += 1;
    }

    /// Pull-to-refresh: re-read the cache and collapse back to page one.
    /// Safe while a `load_more` is pending — the stale ticket will be
    /// dropped, never re-appended.
    pub async fn refresh(&mut self, cache: &CacheHandle) {
        self.load_all(cache).await;
    }
}
