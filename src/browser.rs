use std::collections::BTreeMap;

use crate::config::ReaderOptions;
use crate::location::LocationParts;
use crate::page::Page;
use crate::storage::MemoryStorage;
use crate::{Error, Result};

/// A static site plus a set of tabs reading from it.
///
/// Every tab shares one [`MemoryStorage`], so bookmarks and progress written
/// by one page are visible to the next one opened.
pub struct Browser {
    origin: LocationParts,
    site: BTreeMap<String, String>,
    storage: MemoryStorage,
    options: ReaderOptions,
    viewport: (f64, f64),
    document_height: Option<f64>,
    tabs: Vec<Page>,
    current: usize,
    history: Vec<String>,
}

impl Browser {
    /// `origin` is the scheme and host every site path is served from, e.g.
    /// `https://reader.github.io`.
    pub fn new(origin: &str) -> Result<Self> {
        Ok(Self {
            origin: LocationParts::parse(origin)?,
            site: BTreeMap::new(),
            storage: MemoryStorage::new(),
            options: ReaderOptions::default(),
            viewport: (1280.0, 800.0),
            document_height: None,
            tabs: Vec::new(),
            current: 0,
            history: Vec::new(),
        })
    }

    pub fn with_storage(mut self, storage: MemoryStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = (width, height);
        self
    }

    /// Scroll height given to every page this browser loads.
    pub fn with_document_height(mut self, height: f64) -> Self {
        self.document_height = Some(height);
        self
    }

    /// Serves `html` at `pathname` (for example `/book/01-chapter-1.html`).
    pub fn add_page(&mut self, pathname: &str, html: &str) -> Result<()> {
        let url = self.origin.resolve(pathname)?;
        self.site.insert(url.pathname().to_string(), html.to_string());
        Ok(())
    }

    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    /// Opens `url` (absolute, or a path on the origin) in a new tab and makes
    /// it current. Returns the tab index.
    pub fn open(&mut self, url: &str) -> Result<usize> {
        let page = self.load(url, 0)?;
        self.tabs.push(page);
        self.current = self.tabs.len() - 1;
        Ok(self.current)
    }

    fn load(&mut self, url: &str, start_time_ms: i64) -> Result<Page> {
        let location = self.origin.resolve(url)?;
        let html = self
            .site
            .get(location.pathname())
            .ok_or_else(|| Error::InvalidUrl(format!("no page served at {}", location.href())))?;

        let mut builder = Page::builder(&location.href())
            .html(html)
            .storage(self.storage.clone())
            .viewport(self.viewport.0, self.viewport.1)
            .options(self.options.clone())
            .start_time_ms(start_time_ms);
        if let Some(height) = self.document_height {
            builder = builder.document_height(height);
        }
        let page = builder.build()?;
        log::debug!("loaded {}", location.href());
        self.history.push(location.href());
        Ok(page)
    }

    /// Loads the last location the current page navigated to in place of it.
    /// Returns `false` when the page did not navigate.
    pub fn follow_navigation(&mut self) -> Result<bool> {
        let page = self.current_page_mut()?;
        let Some(target) = page.take_navigations().pop() else {
            return Ok(false);
        };
        let resolved = page.resolve_url(&target)?;
        let now = page.now_ms();
        let next = self.load(&resolved, now)?;
        self.tabs[self.current] = next;
        Ok(true)
    }

    pub fn switch_to(&mut self, index: usize) -> Result<()> {
        if index >= self.tabs.len() {
            return Err(Error::Dom(format!(
                "no tab {index} (open tabs: {})",
                self.tabs.len()
            )));
        }
        self.current = index;
        Ok(())
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn current(&self) -> Result<&Page> {
        self.tabs
            .get(self.current)
            .ok_or_else(|| Error::Dom("browser has no open tabs".into()))
    }

    pub fn current_mut(&mut self) -> Result<&mut Page> {
        self.current_page_mut()
    }

    fn current_page_mut(&mut self) -> Result<&mut Page> {
        self.tabs
            .get_mut(self.current)
            .ok_or_else(|| Error::Dom("browser has no open tabs".into()))
    }

    /// Every URL loaded so far, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }
}
