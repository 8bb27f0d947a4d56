use crate::dom::{Dom, NodeId};
use crate::text_regex::{RegexBuilder, escape};
use crate::Result;

pub(crate) const HIGHLIGHT_CLASS: &str = "search-highlight";

/// Wraps every case-insensitive occurrence of `query` below `container` in a
/// `mark.search-highlight`. Earlier highlights are cleared first. Returns the
/// number of marks created.
pub(crate) fn highlight(dom: &mut Dom, container: NodeId, query: &str) -> Result<usize> {
    clear(dom)?;
    if query.is_empty() {
        return Ok(0);
    }

    let regex = RegexBuilder::new(&escape(query))
        .case_insensitive(true)
        .build()?;

    let mut marks = 0usize;
    for text_node in dom.text_descendants(container) {
        let Some(parent) = dom.parent(text_node) else {
            continue;
        };
        let text = dom.text(text_node).unwrap_or_default().to_string();
        let matches = regex.find_all(&text)?;
        if matches.is_empty() {
            continue;
        }

        let mut cursor = 0usize;
        for found in &matches {
            if found.start() > cursor {
                let before = dom.create_detached_text(&text[cursor..found.start()]);
                dom.insert_before(parent, before, text_node)?;
            }
            let mark = dom.create_detached_element("mark");
            dom.class_add(mark, HIGHLIGHT_CLASS)?;
            let inner = dom.create_detached_text(found.as_str());
            dom.append_child(mark, inner)?;
            dom.insert_before(parent, mark, text_node)?;
            cursor = found.end();
            marks += 1;
        }
        if cursor < text.len() {
            let after = dom.create_detached_text(&text[cursor..]);
            dom.insert_before(parent, after, text_node)?;
        }
        dom.remove_child(parent, text_node)?;
    }

    log::debug!("search {query:?} highlighted {marks} matches");
    Ok(marks)
}

/// Replaces every highlight with its plain text and merges the pieces back
/// together. Returns the number of highlights removed.
pub(crate) fn clear(dom: &mut Dom) -> Result<usize> {
    let highlights = dom.query_selector_all(&format!(".{HIGHLIGHT_CLASS}"))?;
    let mut removed = 0usize;
    for highlight in highlights {
        let Some(parent) = dom.parent(highlight) else {
            continue;
        };
        let text = dom.text_content(highlight);
        let replacement = dom.create_detached_text(&text);
        dom.replace_with(highlight, replacement)?;
        dom.normalize(parent);
        removed += 1;
    }
    Ok(removed)
}
