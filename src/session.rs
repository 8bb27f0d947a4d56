use crate::config::SiteConfig;

/// Mutable state of one page view. Built when the controller starts and
/// dropped with the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub(crate) current_chapter: u32,
    pub(crate) reading_progress: f64,
    pub(crate) chapter_id: String,
    pub(crate) config: SiteConfig,
}

impl SessionState {
    pub(crate) fn new(chapter_id: String, current_chapter: u32, config: SiteConfig) -> Self {
        Self {
            current_chapter,
            reading_progress: 0.0,
            chapter_id,
            config,
        }
    }

    pub fn current_chapter(&self) -> u32 {
        self.current_chapter
    }

    pub fn reading_progress(&self) -> f64 {
        self.reading_progress
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}
