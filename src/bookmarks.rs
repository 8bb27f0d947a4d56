use crate::dom::{Dom, NodeId};
use crate::storage::{Storage, read_json, write_json};
use crate::Result;

pub const BOOKMARKS_KEY: &str = "bookmarks";

const BOOKMARKED_GLYPH: &str = "★";
const UNBOOKMARKED_GLYPH: &str = "☆";

/// Chapter ids the reader marked to come back to, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkSet {
    ids: Vec<String>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the stored set. A missing or unreadable entry is an empty set.
    pub fn load(storage: &dyn Storage) -> Self {
        let stored: Vec<String> = read_json(storage, BOOKMARKS_KEY).unwrap_or_default();
        let mut set = Self::new();
        for id in stored {
            set.insert(&id);
        }
        set
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        write_json(storage, BOOKMARKS_KEY, &self.ids)
    }

    pub fn contains(&self, chapter_id: &str) -> bool {
        self.ids.iter().any(|id| id == chapter_id)
    }

    pub fn insert(&mut self, chapter_id: &str) -> bool {
        if self.contains(chapter_id) {
            return false;
        }
        self.ids.push(chapter_id.to_string());
        true
    }

    pub fn remove(&mut self, chapter_id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != chapter_id);
        before != self.ids.len()
    }

    /// Flips membership; returns whether `chapter_id` is bookmarked afterwards.
    pub fn toggle(&mut self, chapter_id: &str) -> bool {
        if self.remove(chapter_id) {
            false
        } else {
            self.insert(chapter_id)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The chapter a bookmark control belongs to: the nearest `data-chapter`
/// ancestor, else the chapter being read.
pub(crate) fn button_chapter(dom: &Dom, button: NodeId, current_chapter_id: &str) -> Result<String> {
    Ok(dom
        .closest(button, "[data-chapter]")?
        .and_then(|scope| dom.attr(scope, "data-chapter"))
        .unwrap_or_else(|| current_chapter_id.to_string()))
}

pub(crate) fn sync_buttons(dom: &mut Dom, bookmarks: &BookmarkSet, current_chapter_id: &str) -> Result<()> {
    for button in dom.query_selector_all(".bookmark-btn")? {
        let chapter = button_chapter(dom, button, current_chapter_id)?;
        render_button(dom, button, bookmarks.contains(&chapter))?;
    }
    Ok(())
}

fn render_button(dom: &mut Dom, button: NodeId, bookmarked: bool) -> Result<()> {
    if bookmarked {
        dom.class_add(button, "bookmarked")?;
        dom.set_text_content(button, BOOKMARKED_GLYPH)?;
        dom.set_attr(button, "aria-label", "Remove bookmark")?;
        dom.set_attr(button, "aria-pressed", "true")?;
    } else {
        dom.class_remove(button, "bookmarked")?;
        dom.set_text_content(button, UNBOOKMARKED_GLYPH)?;
        dom.set_attr(button, "aria-label", "Bookmark this chapter")?;
        dom.set_attr(button, "aria-pressed", "false")?;
    }
    Ok(())
}
