use serde::Deserialize;

use crate::config::Config;
use crate::core::models::{Surah, SurahText};

/// Response envelope common to every alquran.cloud endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: u16,
    status: String,
    data: T,
}

#[derive(Debug, Deserialize)]
struct QuranBody {
    surahs: Vec<SurahText>,
}

/// Read-only HTTP client for the two content endpoints: the chapter
/// index and the full text body for one translation edition.
#[derive(Clone)]
pub struct QuranApi {
    http: reqwest::Client,
    base: String,
    edition: String,
}

impl QuranApi {
    pub fn new(config: &Config) -> Self {
        QuranApi {
            http: reqwest::Client::new(),
            base: config.api_base.trim_end_matches('/').to_string(),
            edition: config.edition.clone(),
        }
    }

    /// Fetch the chapter metadata index. Source order is preserved
    /// verbatim — jump-to-chapter relies on positional lookup.
    pub async fn fetch_surah_index(&self) -> Result<Vec<Surah>, String> {
        let url = format!("{}/surah", self.base);
        let envelope: Envelope<Vec<Surah>> = self.get_json(&url).await?;
        Ok(envelope.data)
    }

    /// Fetch the entire text — every chapter with its nested verses —
    /// in one call. There is no chapter-scoped variant by design.
    pub async fn fetch_full_text(&self) -> Result<Vec<SurahText>, String> {
        let url = format!("{}/quran/{}", self.base, self.edition);
        let envelope: Envelope<QuranBody> = self.get_json(&url).await?;
        Ok(envelope.data.surahs)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Envelope<T>, String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request to {url} failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Request to {url} failed: HTTP {status}"));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| format!("Failed to decode response from {url}: {e}"))?;

        if envelope.code != 200 {
            return Err(format!(
                "API error from {url}: {} (code {})",
                envelope.status, envelope.code
            ));
        }

        Ok(envelope)
    }
}
