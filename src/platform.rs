use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Warn,
    Error,
}

/// One line the page wrote to its console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
    pub level: ConsoleLevel,
    pub message: String,
}

/// Window geometry. Positions are CSS pixels in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Viewport {
    pub(crate) scroll_y: f64,
    pub(crate) inner_width: f64,
    pub(crate) inner_height: f64,
    pub(crate) document_height: f64,
}

impl Viewport {
    pub(crate) fn max_scroll(&self) -> f64 {
        (self.document_height - self.inner_height).max(0.0)
    }

    /// Moves to `y`, clamped to the scrollable range. Returns whether the
    /// position changed.
    pub(crate) fn scroll_to(&mut self, y: f64) -> bool {
        let next = if y.is_finite() {
            y.clamp(0.0, self.max_scroll())
        } else {
            self.scroll_y
        };
        let moved = next != self.scroll_y;
        self.scroll_y = next;
        moved
    }
}

/// Side effects a page has on the outside world: console output, location
/// changes, print requests and the clipboard.
#[derive(Debug)]
pub(crate) struct Platform {
    console: Vec<ConsoleEntry>,
    navigations: Vec<String>,
    print_requests: usize,
    clipboard_available: bool,
    clipboard_text: Option<String>,
}

impl Platform {
    pub(crate) fn new() -> Self {
        Self {
            console: Vec::new(),
            navigations: Vec::new(),
            print_requests: 0,
            clipboard_available: true,
            clipboard_text: None,
        }
    }

    pub(crate) fn console(&mut self, level: ConsoleLevel, message: String) {
        match level {
            ConsoleLevel::Log => log::info!("{message}"),
            ConsoleLevel::Warn => log::warn!("{message}"),
            ConsoleLevel::Error => log::error!("{message}"),
        }
        self.console.push(ConsoleEntry { level, message });
    }

    pub(crate) fn take_console(&mut self) -> Vec<ConsoleEntry> {
        std::mem::take(&mut self.console)
    }

    pub(crate) fn navigate(&mut self, url: String) {
        log::debug!("navigate to {url}");
        self.navigations.push(url);
    }

    pub(crate) fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub(crate) fn take_navigations(&mut self) -> Vec<String> {
        std::mem::take(&mut self.navigations)
    }

    pub(crate) fn print(&mut self) {
        self.print_requests += 1;
    }

    pub(crate) fn print_requests(&self) -> usize {
        self.print_requests
    }

    pub(crate) fn set_clipboard_available(&mut self, available: bool) {
        self.clipboard_available = available;
    }

    pub(crate) fn write_clipboard(&mut self, text: &str) -> Result<()> {
        if !self.clipboard_available {
            return Err(Error::Platform("clipboard write denied".into()));
        }
        self.clipboard_text = Some(text.to_string());
        Ok(())
    }

    pub(crate) fn clipboard_text(&self) -> Option<&str> {
        self.clipboard_text.as_deref()
    }
}
