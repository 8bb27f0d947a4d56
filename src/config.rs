use serde::Deserialize;

use crate::{Error, Result};

/// Maps a repository name found in the page path to the prefix the site is
/// served under.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryMarker {
    pub marker: String,
    pub base_path: String,
}

impl RepositoryMarker {
    pub fn new(marker: &str, base_path: &str) -> Self {
        Self {
            marker: marker.to_string(),
            base_path: base_path.to_string(),
        }
    }
}

/// How to tell project-pages hosting apart from root hosting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostingRules {
    #[serde(default = "default_hosted_hostnames")]
    pub hosted_hostnames: Vec<String>,
    #[serde(default = "default_hosted_suffix")]
    pub hosted_suffix: String,
    #[serde(default = "default_repository_markers")]
    pub repository_markers: Vec<RepositoryMarker>,
}

impl Default for HostingRules {
    fn default() -> Self {
        Self {
            hosted_hostnames: default_hosted_hostnames(),
            hosted_suffix: default_hosted_suffix(),
            repository_markers: default_repository_markers(),
        }
    }
}

fn default_hosted_hostnames() -> Vec<String> {
    vec![
        "russellpowers.github.io".to_string(),
        "naruto45.github.io".to_string(),
    ]
}

fn default_hosted_suffix() -> String {
    "github.io".to_string()
}

fn default_repository_markers() -> Vec<RepositoryMarker> {
    vec![
        RepositoryMarker::new("Book1--CS---Systems-Design", "/Book1--CS---Systems-Design/"),
        RepositoryMarker::new("Book1_CS/book-website", "/Book1_CS/book-website/"),
    ]
}

impl HostingRules {
    pub fn is_hosted(&self, hostname: &str) -> bool {
        self.hosted_hostnames.iter().any(|known| known == hostname)
            || (!self.hosted_suffix.is_empty() && hostname.contains(&self.hosted_suffix))
    }
}

/// The resolved hosting configuration handed to the page controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    base_path: String,
    is_hosted_mode: bool,
}

impl SiteConfig {
    /// Decides the base path for a page served from `hostname` at `pathname`.
    ///
    /// Hosted pages take the prefix of the first repository marker found in
    /// the path, or `/` when none matches. Every other host uses `/`.
    pub fn resolve(hostname: &str, pathname: &str, rules: &HostingRules) -> Self {
        let is_hosted_mode = rules.is_hosted(hostname);
        let base_path = if is_hosted_mode {
            rules
                .repository_markers
                .iter()
                .find(|marker| pathname.contains(&marker.marker))
                .map_or_else(|| "/".to_string(), |marker| marker.base_path.clone())
        } else {
            "/".to_string()
        };
        log::debug!(
            "resolved base path {base_path} for host={hostname} path={pathname} hosted={is_hosted_mode}"
        );
        Self {
            base_path,
            is_hosted_mode,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn is_hosted_mode(&self) -> bool {
        self.is_hosted_mode
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            is_hosted_mode: false,
        }
    }
}

/// Tunables of the reading experience. Every field has a default, so a JSON
/// document only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    pub scroll_throttle_ms: i64,
    pub resize_throttle_ms: i64,
    pub search_debounce_ms: i64,
    pub animation_frame_ms: i64,
    /// Distance below the top of the viewport used to pick the active section.
    pub section_offset: f64,
    pub first_chapter: u32,
    pub last_chapter: u32,
    pub min_search_length: usize,
    pub copy_feedback_ms: i64,
    pub compact_layout_max_width: f64,
    pub reveal_threshold: f64,
    pub reveal_bottom_margin: f64,
    pub space_scroll_ratio: f64,
    pub hosting: HostingRules,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: 100,
            resize_throttle_ms: 250,
            search_debounce_ms: 300,
            animation_frame_ms: 16,
            section_offset: 100.0,
            first_chapter: 1,
            last_chapter: 14,
            min_search_length: 2,
            copy_feedback_ms: 2000,
            compact_layout_max_width: 1024.0,
            reveal_threshold: 0.1,
            reveal_bottom_margin: 50.0,
            space_scroll_ratio: 0.8,
            hosting: HostingRules::default(),
        }
    }
}

impl ReaderOptions {
    pub fn from_json(src: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(src)
            .map_err(|err| Error::Config(format!("invalid reader options: {err}")))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_chapter == 0 {
            return Err(Error::Config("first_chapter must be at least 1".into()));
        }
        if self.last_chapter < self.first_chapter {
            return Err(Error::Config(format!(
                "chapter range is empty: {}..={}",
                self.first_chapter, self.last_chapter
            )));
        }
        let intervals = [
            ("scroll_throttle_ms", self.scroll_throttle_ms),
            ("resize_throttle_ms", self.resize_throttle_ms),
            ("search_debounce_ms", self.search_debounce_ms),
            ("animation_frame_ms", self.animation_frame_ms),
            ("copy_feedback_ms", self.copy_feedback_ms),
        ];
        if let Some((name, value)) = intervals.iter().find(|(_, value)| *value < 0) {
            return Err(Error::Config(format!("{name} must be non-negative, got {value}")));
        }
        Ok(())
    }
}
