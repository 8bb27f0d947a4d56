use crate::dom::{Dom, NodeId};
use crate::platform::Viewport;
use crate::Result;

const REVEAL_SELECTOR: &str = ".content-section, .code-example, .exercise-container";
pub(crate) const COPY_LABEL: &str = "Copy";
pub(crate) const COPIED_LABEL: &str = "Copied!";
pub(crate) const COPIED_BACKGROUND: &str = "#10b981";

/// Puts a `div.code-header > button.copy-code-btn` in front of every
/// `pre code` block. Returns `(button, code)` pairs.
pub(crate) fn install_copy_buttons(dom: &mut Dom) -> Result<Vec<(NodeId, NodeId)>> {
    let mut installed = Vec::new();
    for code in dom.query_selector_all("pre code")? {
        let Some(parent) = dom.parent(code) else {
            continue;
        };
        let button = dom.create_detached_element("button");
        dom.class_add(button, "copy-code-btn")?;
        dom.set_text_content(button, COPY_LABEL)?;

        let header = dom.create_detached_element("div");
        dom.class_add(header, "code-header")?;
        dom.append_child(header, button)?;
        dom.insert_before(parent, header, code)?;
        installed.push((button, code));
    }
    Ok(installed)
}

pub(crate) fn show_copied(dom: &mut Dom, button: NodeId) -> Result<()> {
    dom.set_text_content(button, COPIED_LABEL)?;
    dom.style_set(button, "background-color", COPIED_BACKGROUND)
}

pub(crate) fn restore_copy_label(dom: &mut Dom, button: NodeId) -> Result<()> {
    dom.set_text_content(button, COPY_LABEL)?;
    dom.style_set(button, "background-color", "")
}

fn nav_pair(dom: &Dom) -> Result<(Option<NodeId>, Option<NodeId>)> {
    Ok((
        dom.query_selector(".nav-toggle")?,
        dom.query_selector(".nav-menu")?,
    ))
}

pub(crate) fn toggle_mobile_nav(dom: &mut Dom) -> Result<()> {
    let (toggle, menu) = nav_pair(dom)?;
    if let Some(menu) = menu {
        dom.class_toggle(menu, "active")?;
    }
    if let Some(toggle) = toggle {
        dom.class_toggle(toggle, "active")?;
    }
    Ok(())
}

/// Closes the menu if it is open. Returns whether anything changed.
pub(crate) fn close_mobile_nav(dom: &mut Dom) -> Result<bool> {
    let (toggle, menu) = nav_pair(dom)?;
    let Some(menu) = menu else {
        return Ok(false);
    };
    if !dom.class_contains(menu, "active") {
        return Ok(false);
    }
    dom.class_remove(menu, "active")?;
    if let Some(toggle) = toggle {
        dom.class_remove(toggle, "active")?;
    }
    Ok(true)
}

/// Whether `target` is inside the nav toggle or the nav menu.
pub(crate) fn is_inside_nav(dom: &Dom, target: NodeId) -> Result<bool> {
    let (toggle, menu) = nav_pair(dom)?;
    Ok([toggle, menu]
        .into_iter()
        .flatten()
        .any(|container| dom.contains(container, target)))
}

/// Stacks the table of contents above the text on narrow windows and floats
/// it beside the text otherwise.
pub(crate) fn apply_responsive_layout(dom: &mut Dom, inner_width: f64, max_compact_width: f64) -> Result<()> {
    let compact = inner_width <= max_compact_width;
    if let Some(toc) = dom.query_selector(".table-of-contents")? {
        let (position, float, width, margin_left) = if compact {
            ("static", "none", "100%", "0")
        } else {
            ("sticky", "right", "280px", "2rem")
        };
        dom.style_set(toc, "position", position)?;
        dom.style_set(toc, "float", float)?;
        dom.style_set(toc, "width", width)?;
        dom.style_set(toc, "margin-left", margin_left)?;
    }
    if let Some(content) = dom.query_selector(".chapter-content")? {
        dom.style_set(content, "margin-right", if compact { "0" } else { "320px" })?;
    }
    Ok(())
}

/// Adds `animate-in` to every revealable block that shows at least
/// `threshold` of its height inside the viewport shrunk by `bottom_margin`.
pub(crate) fn reveal_visible(
    dom: &mut Dom,
    viewport: &Viewport,
    threshold: f64,
    bottom_margin: f64,
) -> Result<usize> {
    let top = viewport.scroll_y;
    let bottom = viewport.scroll_y + viewport.inner_height - bottom_margin;
    let mut revealed = 0usize;
    for node in dom.query_selector_all(REVEAL_SELECTOR)? {
        if dom.class_contains(node, "animate-in") {
            continue;
        }
        let Some(layout) = dom.layout(node) else {
            continue;
        };
        if layout.height <= 0.0 {
            continue;
        }
        let visible = layout.bottom().min(bottom) - layout.top.max(top);
        if visible > 0.0 && visible / layout.height >= threshold {
            dom.class_add(node, "animate-in")?;
            revealed += 1;
        }
    }
    Ok(revealed)
}

/// Skip link plus text-derived labels for unlabeled `.btn` controls.
pub(crate) fn install_accessibility(dom: &mut Dom) -> Result<()> {
    if let Some(body) = dom.body() {
        let skip = dom.create_detached_element("a");
        dom.set_attr(skip, "href", "#main-content")?;
        dom.set_attr(skip, "class", "skip-link")?;
        dom.set_text_content(skip, "Skip to main content")?;
        dom.prepend_child(body, skip)?;
    }
    for button in dom.query_selector_all(".btn")? {
        let unlabeled = dom
            .attr(button, "aria-label")
            .is_none_or(|label| label.is_empty());
        if unlabeled {
            let label = dom.text_content(button).trim().to_string();
            dom.set_attr(button, "aria-label", &label)?;
        }
    }
    Ok(())
}
