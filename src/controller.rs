use std::collections::HashMap;

use serde_json::{Value, json};

use crate::bookmarks::{self, BookmarkSet};
use crate::config::{ReaderOptions, SiteConfig};
use crate::dom::{Dom, NodeId};
use crate::navigation::{self, ChapterNavigator};
use crate::platform::{ConsoleLevel, Platform, Viewport};
use crate::progress::{self, ProgressRecord};
use crate::scheduler::{Debounce, Scheduler, TaskKind, Throttle, ThrottleSlot};
use crate::search;
use crate::session::SessionState;
use crate::storage::Storage;
use crate::ui;
use crate::{Error, Result};

/// Everything a handler may touch besides the controller itself.
pub(crate) struct Env<'a> {
    pub(crate) dom: &'a mut Dom,
    pub(crate) viewport: &'a mut Viewport,
    pub(crate) storage: &'a dyn Storage,
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) platform: &'a mut Platform,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyPress {
    pub(crate) key: String,
    pub(crate) ctrl: bool,
    pub(crate) on_body: bool,
}

/// Reading behaviour of one chapter page, started once the document is
/// parsed and the base path is known.
#[derive(Debug)]
pub(crate) struct PageController {
    session: SessionState,
    options: ReaderOptions,
    navigator: ChapterNavigator,
    scroll_throttle: Throttle,
    resize_throttle: Throttle,
    search_debounce: Debounce,
    frame_pending: bool,
    copy_targets: HashMap<NodeId, NodeId>,
    /// Pending label restore per copy button.
    copy_feedback: HashMap<NodeId, i64>,
    accessibility_ready: bool,
}

impl PageController {
    pub(crate) fn start(env: &mut Env<'_>, config: SiteConfig, options: ReaderOptions) -> Result<Self> {
        let chapter_id = navigation::current_chapter_id(env.dom)?;
        let current_chapter = navigation::parse_leading_number(&chapter_id)
            .filter(|chapter| *chapter >= 1)
            .unwrap_or(options.first_chapter);
        let navigator = ChapterNavigator::new(
            config.base_path(),
            current_chapter,
            options.first_chapter,
            options.last_chapter,
        );

        let mut controller = Self {
            session: SessionState::new(chapter_id, current_chapter, config),
            scroll_throttle: Throttle::new(ThrottleSlot::Scroll, options.scroll_throttle_ms),
            resize_throttle: Throttle::new(ThrottleSlot::Resize, options.resize_throttle_ms),
            search_debounce: Debounce::new(options.search_debounce_ms),
            options,
            navigator,
            frame_pending: false,
            copy_targets: HashMap::new(),
            copy_feedback: HashMap::new(),
            accessibility_ready: false,
        };
        log::debug!(
            "controller started for chapter {} (id {:?})",
            controller.session.current_chapter,
            controller.session.chapter_id
        );

        ui::reveal_visible(
            env.dom,
            env.viewport,
            controller.options.reveal_threshold,
            controller.options.reveal_bottom_margin,
        )?;
        navigation::sync_nav_buttons(env.dom, &controller.navigator)?;
        controller.restore_progress(env)?;
        controller.copy_targets = ui::install_copy_buttons(env.dom)?.into_iter().collect();
        bookmarks::sync_buttons(
            env.dom,
            &BookmarkSet::load(env.storage),
            &controller.session.chapter_id,
        )?;
        Ok(controller)
    }

    pub(crate) fn session(&self) -> &SessionState {
        &self.session
    }

    /// Window `load`: page-view tracking and accessibility affordances.
    pub(crate) fn on_load(&mut self, env: &mut Env<'_>) -> Result<()> {
        let page_view = json!({
            "chapter": self.session.current_chapter,
            "timestamp": env.scheduler.now_ms(),
            "userAgent": concat!("book-site-runtime/", env!("CARGO_PKG_VERSION")),
            "screenSize": format!("{}x{}", env.viewport.inner_width, env.viewport.inner_height),
        });
        env.platform
            .console(ConsoleLevel::Log, format!("Page view tracked: {page_view}"));
        ui::install_accessibility(env.dom)?;
        self.accessibility_ready = true;
        Ok(())
    }

    fn restore_progress(&mut self, env: &mut Env<'_>) -> Result<()> {
        let Some(record) = ProgressRecord::load(env.storage, &self.session.chapter_id) else {
            return Ok(());
        };
        let restored = if record.progress.is_finite() {
            record.progress.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.session.reading_progress = restored;
        progress::render_progress(env.dom, restored)
    }

    pub(crate) fn on_scroll(&mut self, env: &mut Env<'_>) -> Result<()> {
        ui::reveal_visible(
            env.dom,
            env.viewport,
            self.options.reveal_threshold,
            self.options.reveal_bottom_margin,
        )?;
        if self.scroll_throttle.try_acquire(env.scheduler) {
            self.request_frame(env);
        }
        Ok(())
    }

    pub(crate) fn on_resize(&mut self, env: &mut Env<'_>) -> Result<()> {
        if self.resize_throttle.try_acquire(env.scheduler) {
            self.apply_layout(env)?;
        }
        Ok(())
    }

    fn apply_layout(&self, env: &mut Env<'_>) -> Result<()> {
        ui::apply_responsive_layout(
            env.dom,
            env.viewport.inner_width,
            self.options.compact_layout_max_width,
        )
    }

    fn request_frame(&mut self, env: &mut Env<'_>) {
        if self.frame_pending {
            return;
        }
        self.frame_pending = true;
        env.scheduler
            .schedule(self.options.animation_frame_ms, TaskKind::AnimationFrame);
    }

    /// Dispatches a timer task that came due.
    pub(crate) fn run_task(&mut self, env: &mut Env<'_>, kind: TaskKind) -> Result<()> {
        match kind {
            TaskKind::ReleaseThrottle(ThrottleSlot::Scroll) => {
                if self.scroll_throttle.release(env.scheduler) {
                    self.request_frame(env);
                }
                Ok(())
            }
            TaskKind::ReleaseThrottle(ThrottleSlot::Resize) => {
                if self.resize_throttle.release(env.scheduler) {
                    self.apply_layout(env)?;
                }
                Ok(())
            }
            TaskKind::AnimationFrame => self.on_animation_frame(env),
            TaskKind::DebouncedSearch(query) => {
                self.search_debounce.fired();
                self.run_search(env, &query).map(|_| ())
            }
            TaskKind::RestoreCopyLabel { button } => {
                self.copy_feedback.remove(&button);
                ui::restore_copy_label(env.dom, button)
            }
        }
    }

    fn on_animation_frame(&mut self, env: &mut Env<'_>) -> Result<()> {
        self.frame_pending = false;
        let progress = progress::reading_progress(
            env.viewport.scroll_y,
            env.viewport.document_height,
            env.viewport.inner_height,
        );
        self.session.reading_progress = progress;
        progress::render_progress(env.dom, progress)?;

        let active = progress::active_section(
            env.dom,
            env.viewport.scroll_y + self.options.section_offset,
        )?;
        progress::highlight_toc(env.dom, active.as_deref())?;

        ProgressRecord {
            chapter: self.session.chapter_id.clone(),
            progress,
            timestamp: env.scheduler.now_ms(),
        }
        .save(env.storage)
    }

    pub(crate) fn on_search_input(&mut self, env: &mut Env<'_>, value: &str) {
        self.search_debounce
            .arm(env.scheduler, TaskKind::DebouncedSearch(value.to_string()));
    }

    fn run_search(&mut self, env: &mut Env<'_>, query: &str) -> Result<usize> {
        let query = query.to_lowercase();
        if query.chars().count() < self.options.min_search_length {
            search::clear(env.dom)?;
            return Ok(0);
        }
        let Some(content) = env.dom.query_selector(".chapter-content")? else {
            search::clear(env.dom)?;
            return Ok(0);
        };
        search::highlight(env.dom, content, &query)
    }

    /// Handles a click on `target`. Returns `true` when the default action
    /// (following a link) must not run.
    pub(crate) fn on_click(&mut self, env: &mut Env<'_>, target: NodeId) -> Result<bool> {
        if !ui::is_inside_nav(env.dom, target)? {
            ui::close_mobile_nav(env.dom)?;
        }

        let dom = &*env.dom;
        if let Some(button) = dom.closest(target, ".copy-code-btn")? {
            if let Some(code) = self.copy_targets.get(&button).copied() {
                self.copy_code(env, button, code);
                return Ok(true);
            }
        }
        if let Some(button) = dom.closest(target, ".bookmark-btn")? {
            let chapter = bookmarks::button_chapter(dom, button, &self.session.chapter_id)?;
            self.toggle_bookmark(env, &chapter)?;
            return Ok(true);
        }
        if let Some(link) = dom.closest(target, ".toc-nav a")? {
            self.scroll_to_section(env, link)?;
            return Ok(true);
        }
        if let Some(link) = dom.closest(target, ".chapter-link")? {
            if let Some(chapter) = navigation::first_number(&dom.text_content(link)) {
                self.navigate_to_chapter(env, chapter);
            }
            return Ok(true);
        }
        if dom.closest(target, ".print-btn")?.is_some() {
            env.platform.print();
            return Ok(false);
        }
        if dom.closest(target, ".nav-toggle")?.is_some() {
            ui::toggle_mobile_nav(env.dom)?;
        }
        Ok(false)
    }

    fn copy_code(&mut self, env: &mut Env<'_>, button: NodeId, code: NodeId) {
        let text = env.dom.text_content(code);
        let copied = env.platform.write_clipboard(&text).and_then(|()| {
            ui::show_copied(env.dom, button)?;
            if let Some(previous) = self.copy_feedback.remove(&button) {
                env.scheduler.cancel(previous);
            }
            let restore = env.scheduler.schedule(
                self.options.copy_feedback_ms,
                TaskKind::RestoreCopyLabel { button },
            );
            self.copy_feedback.insert(button, restore);
            Ok(())
        });
        if let Err(err) = copied {
            env.platform
                .console(ConsoleLevel::Error, format!("Failed to copy code: {err}"));
        }
    }

    fn scroll_to_section(&mut self, env: &mut Env<'_>, link: NodeId) -> Result<()> {
        let Some(href) = env.dom.attr(link, "href") else {
            return Ok(());
        };
        let target_id = href.strip_prefix('#').unwrap_or(&href);
        let Some(layout) = env.dom.by_id(target_id).and_then(|node| env.dom.layout(node)) else {
            return Ok(());
        };
        if env.viewport.scroll_to(layout.top - self.options.section_offset) {
            self.on_scroll(env)?;
        }
        Ok(())
    }

    pub(crate) fn on_key_down(&mut self, env: &mut Env<'_>, key: &KeyPress) -> Result<bool> {
        let mut prevented = false;
        if key.ctrl && key.key == "ArrowLeft" {
            prevented = true;
            self.navigate_previous(env);
        } else if key.ctrl && key.key == "ArrowRight" {
            prevented = true;
            self.navigate_next(env);
        }

        if key.key == " " && key.on_body {
            prevented = true;
            let delta = env.viewport.inner_height * self.options.space_scroll_ratio;
            if env.viewport.scroll_to(env.viewport.scroll_y + delta) {
                self.on_scroll(env)?;
            }
        }

        if key.key == "Escape" {
            ui::close_mobile_nav(env.dom)?;
        }

        if key.key == "Tab" && self.accessibility_ready {
            if let Some(body) = env.dom.body() {
                env.dom.class_add(body, "keyboard-navigation")?;
            }
        }
        Ok(prevented)
    }

    pub(crate) fn on_mouse_down(&mut self, env: &mut Env<'_>) -> Result<()> {
        if !self.accessibility_ready {
            return Ok(());
        }
        if let Some(body) = env.dom.body() {
            env.dom.class_remove(body, "keyboard-navigation")?;
        }
        Ok(())
    }

    pub(crate) fn navigate_previous(&mut self, env: &mut Env<'_>) -> bool {
        match self.navigator.previous() {
            Some(url) => {
                env.platform.navigate(url);
                true
            }
            None => false,
        }
    }

    pub(crate) fn navigate_next(&mut self, env: &mut Env<'_>) -> bool {
        match self.navigator.next() {
            Some(url) => {
                env.platform.navigate(url);
                true
            }
            None => false,
        }
    }

    pub(crate) fn navigate_to_chapter(&mut self, env: &mut Env<'_>, chapter: u32) -> bool {
        match self.navigator.go_to(chapter) {
            Some(url) => {
                env.platform.navigate(url);
                true
            }
            None => {
                log::debug!("ignoring navigation to chapter {chapter} outside the book");
                false
            }
        }
    }

    /// Flips `chapter_id` in the stored bookmark set and refreshes every
    /// bookmark control. Returns whether the chapter is bookmarked afterwards.
    pub(crate) fn toggle_bookmark(&mut self, env: &mut Env<'_>, chapter_id: &str) -> Result<bool> {
        let mut bookmarks = BookmarkSet::load(env.storage);
        let bookmarked = bookmarks.toggle(chapter_id);
        bookmarks.save(env.storage)?;
        bookmarks::sync_buttons(env.dom, &bookmarks, &self.session.chapter_id)?;
        self.track_event(
            env,
            "bookmark",
            json!({ "chapterId": chapter_id, "bookmarked": bookmarked }),
        );
        Ok(bookmarked)
    }

    pub(crate) fn track_event(&self, env: &mut Env<'_>, name: &str, data: Value) {
        let mut event = json!({
            "event": name,
            "chapter": self.session.current_chapter,
            "timestamp": env.scheduler.now_ms(),
        });
        if let (Some(fields), Value::Object(extra)) = (event.as_object_mut(), data) {
            fields.extend(extra);
        }
        env.platform
            .console(ConsoleLevel::Log, format!("Event tracked: {event}"));
    }

    pub(crate) fn report_error(&self, env: &mut Env<'_>, context: &str, error: &Error) {
        report_error(env, Some(self.session.current_chapter), context, error);
    }
}

/// Logs a failure with the chapter and time it happened; the page carries on.
pub(crate) fn report_error(env: &mut Env<'_>, chapter: Option<u32>, context: &str, error: &Error) {
    env.platform
        .console(ConsoleLevel::Error, format!("Error in {context}: {error}"));
    let record = json!({
        "error": error.to_string(),
        "context": context,
        "chapter": chapter,
        "timestamp": env.scheduler.now_ms(),
    });
    env.platform
        .console(ConsoleLevel::Log, format!("Error logged: {record}"));
}
