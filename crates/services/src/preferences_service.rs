use std::sync::Arc;

use quiz_core::model::Theme;
use storage::repository::PreferenceRepository;

use crate::error::PreferencesError;

#[derive(Clone)]
pub struct PreferencesService {
    repo: Arc<dyn PreferenceRepository>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferenceRepository>) -> Self {
        Self { repo }
    }

    /// Load the persisted theme (dark if missing).
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn load_theme(&self) -> Result<Theme, PreferencesError> {
        let theme = self.repo.get_theme().await?;
        Ok(theme.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn save_theme(&self, theme: Theme) -> Result<Theme, PreferencesError> {
        self.repo.save_theme(theme).await?;
        Ok(theme)
    }

    /// Flip between dark and light and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn toggle_theme(&self) -> Result<Theme, PreferencesError> {
        let next = match self.load_theme().await? {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        self.save_theme(next).await
    }
}
