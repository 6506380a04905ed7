use crate::core::client::QuranApi;
use crate::core::models::{HydrationOutcome, Surah, SurahText};
use crate::core::store::CacheHandle;

pub const LISTING_PAGE_SIZE: usize = 20;

/// Ticket for an in-flight `load_more` on the unfiltered listing. A term
/// change or re-hydration in between makes it stale.
#[derive(Debug)]
pub struct PendingListing {
    generation: u64,
}

/// Search screen: cold-starts with the full fetch-and-cache-all
/// hydration, then offers substring search over chapter names, falling
/// back to a paginated listing when no term is active.
pub struct SearchController {
    index: Vec<Surah>,
    /// Positions into `index` currently shown — the paged prefix when no
    /// term is active, the complete match set otherwise.
    visible_indices: Vec<usize>,
    term: String,
    page: u32,
    is_hydrating: bool,
    is_loading_more: bool,
    generation: u64,
}

impl SearchController {
    pub fn new() -> Self {
        SearchController {
            index: Vec::new(),
            visible_indices: Vec::new(),
            term: String::new(),
            page: 1,
            is_hydrating: false,
            is_loading_more: false,
            generation: 0,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_hydrating(&self) -> bool {
        self.is_hydrating
    }

    /// Chapters currently listed, in index order.
    pub fn listing(&self) -> Vec<&Surah> {
        self.visible_indices.iter().map(|&i| &self.index[i]).collect()
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    // -- hydration -----------------------------------------------------------

    /// Run the cache hydration protocol: one bulk fetch of the entire
    /// text, then one cache write per chapter. The chapter index is only
    /// exposed once every chapter has been persisted — this screen never
    /// proceeds on partial data. Returns `None` when a hydration is
    /// already in flight.
    pub async fn hydrate(
        &mut self,
        api: &QuranApi,
        cache: &CacheHandle,
    ) -> Option<HydrationOutcome> {
        if self.is_hydrating {
            log::debug!("Hydration already in flight, ignoring");
            return None;
        }
        self.is_hydrating = true;

        let outcome = match api.fetch_full_text().await {
            Ok(surahs) => self.persist_and_expose(surahs, cache).await,
            Err(e) => {
                log::error!("Hydration fetch failed: {}", e);
                HydrationOutcome::NetworkFailure(e)
            }
        };

        self.is_hydrating = false;
        Some(outcome)
    }

    /// Persistence half of hydration, split out so it can be driven with
    /// already-fetched data. Each chapter is written in its own
    /// transaction: either its full verse list lands, or nothing does.
    async fn persist_and_expose(
        &mut self,
        surahs: Vec<SurahText>,
        cache: &CacheHandle,
    ) -> HydrationOutcome {
        for surah in &surahs {
            if let Err(e) = cache.save_ayahs(surah.number, &surah.ayahs).await {
                log::error!("Failed to cache ayahs for surah {}: {}", surah.number, e);
                return HydrationOutcome::PartialChapterFailure {
                    chapter: surah.number,
                    reason: e,
                };
            }
            log::debug!("Cached {} ayahs for surah {}", surah.ayahs.len(), surah.number);
        }

        let chapters = surahs.len();
        self.index = surahs.iter().map(SurahText::summary).collect();
        self.generation += 1;
        self.is_loading_more = false;
        self.term.clear();
        self.reset_listing();

        log::info!("Hydration complete: {} chapters cached", chapters);
        HydrationOutcome::Success { chapters }
    }

    fn reset_listing(&mut self) {
        self.page = 1;
        self.visible_indices = (0..self.index.len().min(LISTING_PAGE_SIZE)).collect();
    }

    // -- search --------------------------------------------------------------

    /// Non-empty term: show the complete, unpaginated set of chapters
    /// whose English name contains it (case-insensitive). Empty term:
    /// fall back to the first page of the full listing.
    pub fn set_search_term(&mut self, text: impl Into<String>) {
        self.term = text.into();
        self.generation += 1;
        self.is_loading_more = false;

        if self.term.is_empty() {
            self.reset_listing();
        } else {
            let needle = self.term.to_lowercase();
            self.visible_indices = self
                .index
                .iter()
                .enumerate()
                .filter(|(_, s)| s.english_name.to_lowercase().contains(&needle))
                .map(|(i, _)| i)
                .collect();
        }
    }

    // -- unfiltered listing pagination ---------------------------------------

    /// Claim the in-flight slot for the next listing page. Disabled
    /// entirely while a search term is active.
    pub fn begin_load_more(&mut self) -> Option<PendingListing> {
        if self.is_loading_more || !self.term.is_empty() {
            return None;
        }
        if self.visible_indices.len() >= self.index.len() {
            return None;
        }
        self.is_loading_more = true;
        Some(PendingListing {
            generation: self.generation,
        })
    }

    /// Append the next page of chapters. Stale tickets (issued before a
    /// term change or re-hydration) are dropped.
    pub fn complete_load_more(&mut self, pending: PendingListing) {
        if pending.generation != self.generation {
            log::debug!("Dropping stale listing page");
            return;
        }
        self.is_loading_more = false;

        let start = self.page as usize * LISTING_PAGE_SIZE;
        let end = (start + LISTING_PAGE_SIZE).min(self.index.len());
        if start < self.index.len() {
            self.visible_indices.extend(start..end);
            self.page += 1;
        }
    }
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Ayah;

    fn surah_text(number: u16, english_name: &str, ayah_count: u16) -> SurahText {
        SurahText {
            number,
            name: format!("سورة {number}"),
            english_name: english_name.to_string(),
            ayahs: (1..=ayah_count)
                .map(|n| Ayah {
                    number_in_surah: n,
                    text: format!("{number}:{n}"),
                    translation: format!("translation {number}:{n}"),
                })
                .collect(),
        }
    }

    fn full_text() -> Vec<SurahText> {
        (1..=114)
            .map(|n| surah_text(n, &format!("Surah {n}"), (n % 10) + 3))
            .collect()
    }

    async fn hydrated() -> (CacheHandle, SearchController) {
        let cache = CacheHandle::open_in_memory().unwrap();
        let mut c = SearchController::new();
        let outcome = c.persist_and_expose(full_text(), &cache).await;
        assert_eq!(outcome, HydrationOutcome::Success { chapters: 114 });
        (cache, c)
    }

    fn load_one_more(c: &mut SearchController) {
        let pending = c.begin_load_more().expect("load_more should start");
        c.complete_load_more(pending);
    }

    #[tokio::test]
    async fn hydration_writes_one_entry_per_chapter() {
        let (cache, c) = hydrated().await;
        assert_eq!(c.index_len(), 114);

        for n in 1..=114u16 {
            let ayahs = cache
                .load_ayahs(n)
                .await
                .unwrap()
                .unwrap_or_else(|| panic!("no cache entry for surah {n}"));
            assert_eq!(ayahs.len(), ((n % 10) + 3) as usize);

            // verses belong to this chapter and are strictly increasing
            let numbers: Vec<u16> = ayahs.iter().map(|a| a.number_in_surah).collect();
            assert!(numbers.windows(2).all(|w| w[0] < w[1]));
            assert!(ayahs.iter().all(|a| a.text.starts_with(&format!("{n}:"))));
        }
    }

    #[tokio::test]
    async fn hydration_starts_with_first_listing_page() {
        let (_cache, c) = hydrated().await;
        let listing = c.listing();
        assert_eq!(listing.len(), 20);
        assert_eq!(listing[0].number, 1);
        assert_eq!(listing[19].number, 20);
        assert_eq!(c.page(), 1);
    }

    #[tokio::test]
    async fn failed_chapter_write_reports_partial_failure_without_exposing_index() {
        let cache = CacheHandle::closed();
        let mut c = SearchController::new();

        let outcome = c.persist_and_expose(full_text(), &cache).await;
        match outcome {
            HydrationOutcome::PartialChapterFailure { chapter, .. } => assert_eq!(chapter, 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(c.index_len(), 0);
        assert!(c.listing().is_empty());
    }

    #[tokio::test]
    async fn rehydration_overwrites_previous_entries() {
        let (cache, mut c) = hydrated().await;

        let mut second = full_text();
        second[0].ayahs.push(Ayah {
            number_in_surah: 99,
            text: "1:99".into(),
            translation: "translation 1:99".into(),
        });
        let outcome = c.persist_and_expose(second, &cache).await;
        assert_eq!(outcome, HydrationOutcome::Success { chapters: 114 });

        let ayahs = cache.load_ayahs(1).await.unwrap().unwrap();
        assert_eq!(ayahs.last().unwrap().number_in_surah, 99);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring_match() {
        let cache = CacheHandle::open_in_memory().unwrap();
        let mut c = SearchController::new();
        c.persist_and_expose(
            vec![surah_text(1, "Al-Fatiha", 7), surah_text(10, "Yunus", 9)],
            &cache,
        )
        .await;

        c.set_search_term("al");
        let names: Vec<&str> = c.listing().iter().map(|s| s.english_name.as_str()).collect();
        assert_eq!(names, vec!["Al-Fatiha"]);

        c.set_search_term("FATI");
        assert_eq!(c.listing().len(), 1);

        c.set_search_term("xyz");
        assert!(c.listing().is_empty());
    }

    #[tokio::test]
    async fn search_results_are_not_paginated() {
        let (_cache, mut c) = hydrated().await;
        // matches every chapter, well past one listing page
        c.set_search_term("Surah");
        assert_eq!(c.listing().len(), 114);
    }

    #[tokio::test]
    async fn clearing_the_term_restores_the_first_page_in_order() {
        let (_cache, mut c) = hydrated().await;
        c.set_search_term("Surah 11");
        assert!(!c.listing().is_empty());

        c.set_search_term("");
        let numbers: Vec<u16> = c.listing().iter().map(|s| s.number).collect();
        let expected: Vec<u16> = (1..=20).collect();
        assert_eq!(numbers, expected);
        assert_eq!(c.page(), 1);
    }

    #[tokio::test]
    async fn listing_pages_by_twenty() {
        let (_cache, mut c) = hydrated().await;
        load_one_more(&mut c);
        assert_eq!(c.listing().len(), 40);
        assert_eq!(c.page(), 2);

        load_one_more(&mut c);
        load_one_more(&mut c);
        load_one_more(&mut c);
        load_one_more(&mut c);
        assert_eq!(c.listing().len(), 114);
        assert!(c.begin_load_more().is_none());
    }

    #[tokio::test]
    async fn load_more_is_disabled_while_searching() {
        let (_cache, mut c) = hydrated().await;
        c.set_search_term("Surah");
        assert!(c.begin_load_more().is_none());
    }

    #[tokio::test]
    async fn concurrent_begin_is_a_no_op() {
        let (_cache, mut c) = hydrated().await;
        let pending = c.begin_load_more().unwrap();
        assert!(c.begin_load_more().is_none());
        c.complete_load_more(pending);
        assert_eq!(c.listing().len(), 40);
    }

    #[tokio::test]
    async fn term_change_drops_a_pending_listing_page() {
        let (_cache, mut c) = hydrated().await;
        let stale = c.begin_load_more().unwrap();

        c.set_search_term("Surah 1");
        let matches = c.listing().len();
        c.complete_load_more(stale);

        // the stale page never lands on top of the search results
        assert_eq!(c.listing().len(), matches);
    }

    #[tokio::test]
    async fn hydrate_is_guarded_against_concurrent_runs() {
        let mut c = SearchController::new();
        c.is_hydrating = true;

        let cache = CacheHandle::open_in_memory().unwrap();
        let config = crate::config::Config::default();
        let api = crate::core::client::QuranApi::new(&config);
        assert!(c.hydrate(&api, &cache).await.is_none());
    }
}
