use serde::{Deserialize, Serialize};

use crate::dom::Dom;
use crate::storage::{Storage, read_json, write_json};
use crate::Result;

/// Percentage of the scrollable height above the viewport top, in `[0, 100]`.
///
/// A document that does not overflow the viewport has no scrollable height
/// and reads as `0`.
pub fn reading_progress(scroll_top: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if !(scrollable > 0.0) || !scroll_top.is_finite() {
        return 0.0;
    }
    (scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}

pub fn progress_key(chapter_id: &str) -> String {
    format!("progress_{chapter_id}")
}

/// Last known reading position of one chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub chapter: String,
    pub progress: f64,
    pub timestamp: i64,
}

impl ProgressRecord {
    pub fn load(storage: &dyn Storage, chapter_id: &str) -> Option<Self> {
        read_json(storage, &progress_key(chapter_id))
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        write_json(storage, &progress_key(&self.chapter), self)
    }
}

pub(crate) fn render_progress(dom: &mut Dom, progress: f64) -> Result<()> {
    if let Some(fill) = dom.query_selector(".progress-fill")? {
        dom.style_set(fill, "width", &format!("{progress}%"))?;
    }
    if let Some(text) = dom.query_selector(".progress-text")? {
        dom.set_text_content(text, &format!("{}% Complete", progress.round()))?;
    }
    Ok(())
}

/// Id of the last `.content-section` whose box contains `probe_y`.
pub(crate) fn active_section(dom: &Dom, probe_y: f64) -> Result<Option<String>> {
    let mut current = None;
    for section in dom.query_selector_all(".content-section")? {
        let (Some(layout), Some(id)) = (dom.layout(section), dom.attr(section, "id")) else {
            continue;
        };
        if layout.contains(probe_y) {
            current = Some(id);
        }
    }
    Ok(current)
}

/// Marks the TOC link pointing at `active` and clears every other one.
pub(crate) fn highlight_toc(dom: &mut Dom, active: Option<&str>) -> Result<()> {
    let target = active.map(|id| format!("#{id}"));
    for link in dom.query_selector_all(".toc-nav a")? {
        dom.class_remove(link, "active")?;
        if target.is_some() && dom.attr(link, "href") == target {
            dom.class_add(link, "active")?;
        }
    }
    Ok(())
}
