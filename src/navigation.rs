use crate::dom::Dom;
use crate::Result;

/// URL of chapter `chapter` under `base_path`: `<base>NN-chapter-N.html`.
pub fn chapter_url(base_path: &str, chapter: u32) -> String {
    format!("{base_path}{chapter:02}-chapter-{chapter}.html")
}

/// Computes chapter destinations inside a closed chapter range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterNavigator {
    base_path: String,
    current: u32,
    first: u32,
    last: u32,
}

impl ChapterNavigator {
    pub fn new(base_path: &str, current: u32, first: u32, last: u32) -> Self {
        Self {
            base_path: base_path.to_string(),
            current,
            first,
            last,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn contains(&self, chapter: u32) -> bool {
        (self.first..=self.last).contains(&chapter)
    }

    /// `None` on the first chapter.
    pub fn previous(&self) -> Option<String> {
        if self.current <= self.first {
            return None;
        }
        self.go_to(self.current - 1)
    }

    /// `None` on the last chapter.
    pub fn next(&self) -> Option<String> {
        if self.current >= self.last {
            return None;
        }
        self.go_to(self.current + 1)
    }

    pub fn go_to(&self, chapter: u32) -> Option<String> {
        self.contains(chapter)
            .then(|| chapter_url(&self.base_path, chapter))
    }
}

/// Chapter id shown on the page: the `.chapter-number` text without its
/// `Chapter ` label, or `"1"` when the page has no such element.
pub(crate) fn current_chapter_id(dom: &Dom) -> Result<String> {
    Ok(match dom.query_selector(".chapter-number")? {
        Some(node) => dom.text_content(node).replacen("Chapter ", "", 1),
        None => "1".to_string(),
    })
}

/// Leading integer of `text` after whitespace, like `parseInt`.
pub(crate) fn parse_leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// First run of digits anywhere in `text`.
pub(crate) fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|ch: char| ch.is_ascii_digit())?;
    parse_leading_number(&text[start..])
}

/// Points the previous/next buttons at the neighbouring chapters.
pub(crate) fn sync_nav_buttons(dom: &mut Dom, navigator: &ChapterNavigator) -> Result<()> {
    if let (Some(prev), Some(url)) = (dom.query_selector(".btn-secondary")?, navigator.previous()) {
        dom.set_attr(prev, "href", &url)?;
    }
    if let (Some(next), Some(url)) = (dom.query_selector(".btn-primary")?, navigator.next()) {
        dom.set_attr(next, "href", &url)?;
    }
    Ok(())
}
