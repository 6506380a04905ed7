use crate::app::viewport::{jump_to_row, JumpResolution, ListViewport};
use crate::core::client::QuranApi;
use crate::core::error::DataError;
use crate::core::models::Surah;

pub const SURAH_COUNT: u16 = 114;

/// Chapter list screen: the full metadata index in source order, plus the
/// jump-to-chapter affordance.
pub struct SurahListController {
    index: Vec<Surah>,
    is_loading: bool,
    last_error: Option<DataError>,

    show_jump_input: bool,
    jump_input: String,
}

impl SurahListController {
    pub fn new() -> Self {
        SurahListController {
            index: Vec::new(),
            is_loading: false,
            last_error: None,
            show_jump_input: false,
            jump_input: String::new(),
        }
    }

    /// Chapters in source order (1..114). Positional lookup depends on
    /// this order being preserved verbatim.
    pub fn index(&self) -> &[Surah] {
        &self.index
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&DataError> {
        self.last_error.as_ref()
    }

    /// Fetch the chapter metadata index. A failed fetch leaves the screen
    /// data-less; the user re-triggers by calling again.
    pub async fn load_index(&mut self, api: &QuranApi) {
        self.is_loading = true;
        match api.fetch_surah_index().await {
            Ok(index) => {
                log::info!("Loaded {} surahs", index.len());
                self.index = index;
                self.last_error = None;
            }
            Err(e) => {
                log::error!("Failed to fetch surah index: {}", e);
                self.last_error = Some(DataError::Network(e));
            }
        }
        self.is_loading = false;
    }

    // -- jump-to-chapter -----------------------------------------------------

    pub fn toggle_jump_input(&mut self) {
        self.show_jump_input = !self.show_jump_input;
    }

    pub fn jump_input_visible(&self) -> bool {
        self.show_jump_input
    }

    pub fn set_jump_input(&mut self, text: impl Into<String>) {
        self.jump_input = text.into();
    }

    pub fn jump_input(&self) -> &str {
        &self.jump_input
    }

    /// Validate the typed jump target and scroll the viewport to that
    /// chapter's position. On validation failure the typed input is
    /// retained so the user can correct it; it is cleared only on a
    /// successful jump.
    pub fn submit_jump(
        &mut self,
        view: &mut dyn ListViewport,
    ) -> Result<(usize, JumpResolution), DataError> {
        let number: u16 = self
            .jump_input
            .trim()
            .parse()
            .map_err(|_| DataError::Validation("enter a number between 1 and 114".into()))?;

        if number < 1 || number > SURAH_COUNT {
            return Err(DataError::Validation(
                "enter a number between 1 and 114".into(),
            ));
        }

        let position = self
            .index
            .iter()
            .position(|s| s.number == number)
            .ok_or_else(|| {
                log::warn!("Jump target {} not present in loaded index", number);
                DataError::Validation(format!("surah {number} is not loaded yet"))
            })?;

        let resolution = jump_to_row(view, position);
        self.jump_input.clear();
        self.show_jump_input = false;
        Ok((position, resolution))
    }
}

impl Default for SurahListController {
    fn default() -> Self {
        Self::new()
    }
}
