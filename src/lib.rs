//! Deterministic client-side runtime for a static multi-chapter book website.
//!
//! A chapter page is parsed into an in-memory DOM and driven through a [`Page`]:
//! scrolling, clicks, key presses and typing are dispatched the way a browser
//! would, timers run on a virtual clock, and durable storage is an in-memory
//! key-value store that several pages can share.
//!
//! ```
//! use book_site_runtime::{MemoryStorage, Page};
//!
//! let storage = MemoryStorage::new();
//! let mut page = Page::builder("https://reader.github.io/Book1--CS---Systems-Design/01-chapter-1.html")
//!     .html(r#"<span class="chapter-number">Chapter 1</span><button class="bookmark-btn">☆</button>"#)
//!     .storage(storage.clone())
//!     .build()?;
//!
//! assert_eq!(page.site_config().base_path(), "/Book1--CS---Systems-Design/");
//! page.click(".bookmark-btn")?;
//! page.assert_text(".bookmark-btn", "★")?;
//! assert_eq!(storage.get_item("bookmarks").as_deref(), Some(r#"["1"]"#));
//! # Ok::<(), book_site_runtime::Error>(())
//! ```

use std::error::Error as StdError;
use std::fmt;

mod bookmarks;
mod browser;
mod config;
mod controller;
mod dom;
mod html;
mod location;
mod navigation;
mod page;
mod paths;
mod platform;
mod progress;
mod scheduler;
mod search;
mod selector;
mod session;
mod storage;
mod text_regex;
mod ui;

pub use bookmarks::{BOOKMARKS_KEY, BookmarkSet};
pub use browser::Browser;
pub use config::{HostingRules, ReaderOptions, RepositoryMarker, SiteConfig};
pub use navigation::{ChapterNavigator, chapter_url};
pub use page::{KeyEvent, Page, PageBuilder, ReadyState};
pub use platform::{ConsoleEntry, ConsoleLevel};
pub use progress::{ProgressRecord, progress_key, reading_progress};
pub use scheduler::PendingTimer;
pub use session::SessionState;
pub use storage::{MemoryStorage, Storage};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    Dom(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    InvalidUrl(String),
    Storage(String),
    Config(String),
    Timer(String),
    Platform(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::Dom(msg) => write!(f, "dom error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::InvalidUrl(url) => write!(f, "invalid url: {url}"),
            Self::Storage(msg) => write!(f, "storage error: {msg}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
            Self::Timer(msg) => write!(f, "timer error: {msg}"),
            Self::Platform(msg) => write!(f, "platform error: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
mod tests;
