use serde_json::Value;

use crate::config::{ReaderOptions, SiteConfig};
use crate::controller::{self, Env, KeyPress, PageController};
use crate::dom::{Dom, LayoutBox, NodeId, truncate_chars};
use crate::html::{parse_html, parse_html_into};
use crate::location::LocationParts;
use crate::paths::PathRewriter;
use crate::platform::{ConsoleEntry, Platform, Viewport};
use crate::scheduler::{PendingTimer, Scheduler};
use crate::session::SessionState;
use crate::storage::{MemoryStorage, Storage};
use crate::{Error, Result};

const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// A key press as delivered to `keydown` listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    key: String,
    ctrl: bool,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

/// Configures a [`Page`] before it is loaded.
pub struct PageBuilder {
    url: String,
    html: String,
    storage: Option<Box<dyn Storage>>,
    inner_width: f64,
    inner_height: f64,
    document_height: Option<f64>,
    options: ReaderOptions,
    start_time_ms: i64,
    defer_content_loaded: bool,
}

impl PageBuilder {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            html: String::new(),
            storage: None,
            inner_width: DEFAULT_VIEWPORT_WIDTH,
            inner_height: DEFAULT_VIEWPORT_HEIGHT,
            document_height: None,
            options: ReaderOptions::default(),
            start_time_ms: 0,
            defer_content_loaded: false,
        }
    }

    pub fn html(mut self, html: &str) -> Self {
        self.html = html.to_string();
        self
    }

    /// Storage the page reads and writes. Defaults to a private
    /// [`MemoryStorage`].
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn viewport(mut self, width: f64, height: f64) -> Self {
        self.inner_width = width;
        self.inner_height = height;
        self
    }

    /// Total scroll height. Defaults to the viewport height (nothing to scroll).
    pub fn document_height(mut self, height: f64) -> Self {
        self.document_height = Some(height);
        self
    }

    pub fn options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn start_time_ms(mut self, start_time_ms: i64) -> Self {
        self.start_time_ms = start_time_ms;
        self
    }

    /// Stops after the first parse; [`Page::finish_loading`] fires
    /// `DOMContentLoaded` and `load`.
    pub fn defer_content_loaded(mut self) -> Self {
        self.defer_content_loaded = true;
        self
    }

    pub fn build(self) -> Result<Page> {
        self.options.validate()?;
        let location = LocationParts::parse(&self.url)?;
        let config = SiteConfig::resolve(
            location.hostname(),
            location.pathname(),
            &self.options.hosting,
        );
        let dom = parse_html(&with_body(&self.html))?;

        let mut page = Page {
            location,
            dom,
            viewport: Viewport {
                scroll_y: 0.0,
                inner_width: self.inner_width,
                inner_height: self.inner_height,
                document_height: self.document_height.unwrap_or(self.inner_height),
            },
            storage: self
                .storage
                .unwrap_or_else(|| Box::new(MemoryStorage::new())),
            scheduler: Scheduler::new(self.start_time_ms),
            platform: Platform::new(),
            rewriter: PathRewriter::new(),
            config,
            options: self.options,
            controller: None,
            ready_state: ReadyState::Loading,
        };
        page.rewrite_paths()?;
        if !self.defer_content_loaded {
            page.finish_loading()?;
        }
        Ok(page)
    }
}

fn with_body(html: &str) -> String {
    if html.to_ascii_lowercase().contains("<body") {
        html.to_string()
    } else {
        format!("<body>{html}</body>")
    }
}

/// One loaded chapter page and the browser around it.
pub struct Page {
    location: LocationParts,
    dom: Dom,
    viewport: Viewport,
    storage: Box<dyn Storage>,
    scheduler: Scheduler,
    platform: Platform,
    rewriter: PathRewriter,
    config: SiteConfig,
    options: ReaderOptions,
    controller: Option<PageController>,
    ready_state: ReadyState,
}

impl Page {
    pub fn builder(url: &str) -> PageBuilder {
        PageBuilder::new(url)
    }

    pub fn from_html(url: &str, html: &str) -> Result<Self> {
        Self::builder(url).html(html).build()
    }

    pub fn url(&self) -> String {
        self.location.href()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn site_config(&self) -> &SiteConfig {
        &self.config
    }

    /// `None` until `DOMContentLoaded`.
    pub fn session(&self) -> Option<&SessionState> {
        self.controller.as_ref().map(PageController::session)
    }

    pub fn reading_progress(&self) -> f64 {
        self.session().map_or(0.0, SessionState::reading_progress)
    }

    pub fn current_chapter(&self) -> Option<u32> {
        self.session().map(SessionState::current_chapter)
    }

    fn rewrite_paths(&mut self) -> Result<usize> {
        let rewritten = self.rewriter.apply(&mut self.dom, &self.config)?;
        log::debug!("rewrote {rewritten} references under {}", self.config.base_path());
        Ok(rewritten)
    }

    /// Parses more markup into the first element matching `parent_selector`,
    /// the way a streaming parser would before `DOMContentLoaded`.
    pub fn append_html(&mut self, parent_selector: &str, html: &str) -> Result<()> {
        let parent = self.select_one(parent_selector)?;
        parse_html_into(&mut self.dom, parent, html)
    }

    /// Fires `DOMContentLoaded` then `load`. Does nothing once loaded.
    pub fn finish_loading(&mut self) -> Result<()> {
        if self.ready_state != ReadyState::Loading {
            return Ok(());
        }
        self.rewrite_paths()?;
        self.ready_state = ReadyState::Interactive;

        let mut env = Env {
            dom: &mut self.dom,
            viewport: &mut self.viewport,
            storage: self.storage.as_ref(),
            scheduler: &mut self.scheduler,
            platform: &mut self.platform,
        };
        match PageController::start(&mut env, self.config.clone(), self.options.clone()) {
            Ok(started) => self.controller = Some(started),
            Err(err) => controller::report_error(&mut env, None, "init", &err),
        }

        self.ready_state = ReadyState::Complete;
        self.dispatch("load", |controller, env| controller.on_load(env));
        Ok(())
    }

    /// Runs `handler` against the controller. Failures are reported to the
    /// console and turned into `R::default()`.
    fn dispatch<R: Default>(
        &mut self,
        context: &str,
        handler: impl FnOnce(&mut PageController, &mut Env<'_>) -> Result<R>,
    ) -> R {
        let Some(controller) = self.controller.as_mut() else {
            return R::default();
        };
        let mut env = Env {
            dom: &mut self.dom,
            viewport: &mut self.viewport,
            storage: self.storage.as_ref(),
            scheduler: &mut self.scheduler,
            platform: &mut self.platform,
        };
        match handler(controller, &mut env) {
            Ok(value) => value,
            Err(err) => {
                controller.report_error(&mut env, context, &err);
                R::default()
            }
        }
    }

    pub fn set_layout(&mut self, selector: &str, top: f64, height: f64) -> Result<()> {
        let node = self.select_one(selector)?;
        self.dom.set_layout(node, LayoutBox { top, height })
    }

    pub fn set_document_height(&mut self, height: f64) {
        self.viewport.document_height = height;
        self.viewport.scroll_to(self.viewport.scroll_y);
    }

    pub fn scroll_y(&self) -> f64 {
        self.viewport.scroll_y
    }

    /// Scrolls the window; a `scroll` event fires when the position changes.
    pub fn scroll_to(&mut self, y: f64) -> Result<()> {
        if self.viewport.scroll_to(y) {
            self.dispatch("scroll", |controller, env| controller.on_scroll(env));
        }
        Ok(())
    }

    pub fn scroll_by(&mut self, delta: f64) -> Result<()> {
        self.scroll_to(self.viewport.scroll_y + delta)
    }

    /// Resizes the window and fires `resize`.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) -> Result<()> {
        if width < 0.0 || height < 0.0 {
            return Err(Error::Dom(format!("invalid viewport size {width}x{height}")));
        }
        self.viewport.inner_width = width;
        self.viewport.inner_height = height;
        self.viewport.scroll_to(self.viewport.scroll_y);
        self.dispatch("resize", |controller, env| controller.on_resize(env));
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let prevented = self.dispatch("click", |controller, env| controller.on_click(env, target));
        if !prevented {
            self.follow_link(target)?;
        }
        Ok(())
    }

    fn follow_link(&mut self, target: NodeId) -> Result<()> {
        let Some(href) = self
            .dom
            .closest(target, "a[href]")?
            .and_then(|anchor| self.dom.attr(anchor, "href"))
        else {
            return Ok(());
        };
        if let Some(fragment) = href.strip_prefix('#') {
            let top = self
                .dom
                .by_id(fragment)
                .and_then(|node| self.dom.layout(node))
                .map(|layout| layout.top);
            if let Some(top) = top {
                self.scroll_to(top)?;
            }
            return Ok(());
        }
        self.platform.navigate(href);
        Ok(())
    }

    pub fn mouse_down(&mut self, selector: &str) -> Result<()> {
        self.select_one(selector)?;
        self.dispatch("mousedown", |controller, env| controller.on_mouse_down(env));
        Ok(())
    }

    /// Presses a key with focus on the document body.
    pub fn key_down(&mut self, event: KeyEvent) -> Result<()> {
        self.dispatch_key(event, true);
        Ok(())
    }

    /// Presses a key with focus on the element matching `selector`.
    pub fn key_down_on(&mut self, selector: &str, event: KeyEvent) -> Result<()> {
        let target = self.select_one(selector)?;
        let on_body = self.dom.body() == Some(target);
        self.dispatch_key(event, on_body);
        Ok(())
    }

    fn dispatch_key(&mut self, event: KeyEvent, on_body: bool) {
        let press = KeyPress {
            key: event.key,
            ctrl: event.ctrl,
            on_body,
        };
        self.dispatch("keydown", |controller, env| controller.on_key_down(env, &press));
    }

    /// Replaces the value of a form control and fires `input`.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dom.set_value(target, text)?;
        if self.dom.class_contains(target, "search-input") {
            self.dispatch("input", |controller, env| {
                controller.on_search_input(env, text);
                Ok(())
            });
        }
        Ok(())
    }

    pub fn navigate_to_chapter(&mut self, chapter: u32) -> bool {
        self.dispatch("navigateToChapter", |controller, env| {
            Ok(controller.navigate_to_chapter(env, chapter))
        })
    }

    pub fn navigate_previous(&mut self) -> bool {
        self.dispatch("navigatePrevious", |controller, env| {
            Ok(controller.navigate_previous(env))
        })
    }

    pub fn navigate_next(&mut self) -> bool {
        self.dispatch("navigateNext", |controller, env| Ok(controller.navigate_next(env)))
    }

    /// Flips the bookmark of `chapter_id`; returns whether it is bookmarked
    /// afterwards. A failed write is reported and reads as `false`.
    pub fn toggle_bookmark(&mut self, chapter_id: &str) -> bool {
        self.dispatch("toggleBookmark", |controller, env| {
            controller.toggle_bookmark(env, chapter_id)
        })
    }

    pub fn track_event(&mut self, name: &str, data: Value) {
        self.dispatch("trackEvent", |controller, env| {
            controller.track_event(env, name, data);
            Ok(())
        });
    }

    pub fn report_error(&mut self, context: &str, error: &Error) {
        let chapter = self.current_chapter();
        let mut env = Env {
            dom: &mut self.dom,
            viewport: &mut self.viewport,
            storage: self.storage.as_ref(),
            scheduler: &mut self.scheduler,
            platform: &mut self.platform,
        };
        controller::report_error(&mut env, chapter, context, error);
    }

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending_timers()
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Timer(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let target = self.scheduler.now_ms().saturating_add(delta_ms);
        self.advance_time_to(target)
    }

    /// Moves the clock to `target_ms`, running every timer due on the way in
    /// due order.
    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.scheduler.now_ms() {
            return self.scheduler.advance_clock_to(target_ms);
        }
        let ran = self.run_timer_queue(Some(target_ms), true)?;
        self.scheduler.advance_clock_to(target_ms)?;
        log::trace!("[timer] advance_to to={target_ms} ran={ran}");
        Ok(())
    }

    /// Runs every queued timer, jumping the clock forward as needed.
    pub fn flush(&mut self) -> Result<()> {
        let ran = self.run_timer_queue(None, true)?;
        log::trace!("[timer] flush now_ms={} ran={ran}", self.scheduler.now_ms());
        Ok(())
    }

    /// Runs timers already due without moving the clock.
    pub fn run_due_timers(&mut self) -> Result<usize> {
        self.run_timer_queue(Some(self.scheduler.now_ms()), false)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(task) = self.scheduler.pop_next(due_limit, advance_clock) {
            steps += 1;
            self.scheduler.check_step_limit(steps)?;
            self.dispatch("timer", |controller, env| controller.run_task(env, task.kind));
        }
        Ok(steps)
    }

    pub fn take_navigations(&mut self) -> Vec<String> {
        self.platform.take_navigations()
    }

    pub fn last_navigation(&self) -> Option<&str> {
        self.platform.navigations().last().map(String::as_str)
    }

    /// Resolves a navigation target against this page's URL.
    pub fn resolve_url(&self, reference: &str) -> Result<String> {
        Ok(self.location.resolve(reference)?.href())
    }

    pub fn print_count(&self) -> usize {
        self.platform.print_requests()
    }

    pub fn clipboard_text(&self) -> Option<&str> {
        self.platform.clipboard_text()
    }

    pub fn set_clipboard_available(&mut self, available: bool) {
        self.platform.set_clipboard_available(available);
    }

    pub fn take_console(&mut self) -> Vec<ConsoleEntry> {
        self.platform.take_console()
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    /// Current value of a form control.
    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.value(target).unwrap_or_default().to_string())
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.style_get(target, property))
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.class_contains(target, class_name))
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_attr(&self, selector: &str, name: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.attr(target, name);
        if actual.as_deref() != Some(expected) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("{name}={expected}"),
                actual: actual.map_or_else(|| format!("no {name}"), |value| format!("{name}={value}")),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, present: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name);
        if actual != present {
            let describe = |on: bool| {
                if on {
                    format!("class {class_name}")
                } else {
                    format!("no class {class_name}")
                }
            };
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: describe(present),
                actual: describe(actual),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }
}
