use super::*;

const LISTING_HTML: &str = r#"
<span class="chapter-number">Chapter 1</span>
<ul class="chapter-list">
  <li data-chapter="1"><a class="chapter-link" href="01-chapter-1.html">Chapter 1: Foundations</a><button class="bookmark-btn">☆</button></li>
  <li data-chapter="2"><a class="chapter-link" href="02-chapter-2.html">Chapter 2: Storage</a><button class="bookmark-btn">☆</button></li>
  <li data-chapter="12"><a class="chapter-link" href="012-chapter-12.html">Chapter 12: Caching</a><button class="bookmark-btn">☆</button></li>
</ul>
"#;

fn chapter_page_for(chapter: u32) -> Result<Page> {
    let url = format!("https://reader.github.io/Book1--CS---Systems-Design/{}", chapter_url("", chapter));
    let html = CHAPTER_HTML.replace("Chapter 3", &format!("Chapter {chapter}"));
    Page::builder(&url).html(&html).document_height(2800.0).build()
}

#[test]
fn bookmark_button_reflects_membership_after_each_toggle() -> Result<()> {
    let storage = MemoryStorage::new();
    let mut page = chapter_page_with_storage(&storage)?;
    page.assert_text(".bookmark-btn", "☆")?;
    page.assert_attr(".bookmark-btn", "aria-pressed", "false")?;
    page.assert_attr(".bookmark-btn", "aria-label", "Bookmark this chapter")?;

    page.click(".bookmark-btn")?;
    page.assert_text(".bookmark-btn", "★")?;
    page.assert_class(".bookmark-btn", "bookmarked", true)?;
    page.assert_attr(".bookmark-btn", "aria-pressed", "true")?;
    page.assert_attr(".bookmark-btn", "aria-label", "Remove bookmark")?;
    assert_eq!(storage.get_item(BOOKMARKS_KEY).as_deref(), Some(r#"["3"]"#));

    page.click(".bookmark-btn")?;
    page.assert_text(".bookmark-btn", "☆")?;
    page.assert_class(".bookmark-btn", "bookmarked", false)?;
    assert_eq!(storage.get_item(BOOKMARKS_KEY).as_deref(), Some("[]"));
    Ok(())
}

#[test]
fn stored_bookmark_is_shown_at_load() -> Result<()> {
    let storage = MemoryStorage::new();
    storage.set_item(BOOKMARKS_KEY, r#"["9","3"]"#)?;
    let page = chapter_page_with_storage(&storage)?;
    page.assert_text(".bookmark-btn", "★")?;
    page.assert_class(".bookmark-btn", "bookmarked", true)?;
    Ok(())
}

#[test]
fn toggle_keeps_other_chapters_and_appends_new_ones() -> Result<()> {
    let storage = MemoryStorage::new();
    storage.set_item(BOOKMARKS_KEY, r#"["1","5"]"#)?;
    let mut page = chapter_page_with_storage(&storage)?;

    assert!(page.toggle_bookmark("3"));
    assert_eq!(storage.get_item(BOOKMARKS_KEY).as_deref(), Some(r#"["1","5","3"]"#));
    assert!(!page.toggle_bookmark("5"));
    assert_eq!(storage.get_item(BOOKMARKS_KEY).as_deref(), Some(r#"["1","3"]"#));
    Ok(())
}

#[test]
fn bookmark_toggle_is_tracked() -> Result<()> {
    let mut page = chapter_page()?;
    page.take_console();
    page.click(".bookmark-btn")?;
    let logs = console_messages(&mut page, ConsoleLevel::Log);
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("Event tracked: "));
    assert!(logs[0].contains(r#""event":"bookmark""#));
    assert!(logs[0].contains(r#""chapterId":"3""#));
    assert!(logs[0].contains(r#""bookmarked":true"#));
    Ok(())
}

#[test]
fn unreadable_bookmarks_read_as_empty_set() -> Result<()> {
    let storage = MemoryStorage::new();
    storage.set_item(BOOKMARKS_KEY, "[3, oops")?;
    assert!(BookmarkSet::load(&storage).is_empty());

    let mut page = chapter_page_with_storage(&storage)?;
    page.assert_text(".bookmark-btn", "☆")?;
    page.click(".bookmark-btn")?;
    assert_eq!(storage.get_item(BOOKMARKS_KEY).as_deref(), Some(r#"["3"]"#));
    Ok(())
}

#[test]
fn duplicate_stored_ids_collapse_on_load() -> Result<()> {
    let storage = MemoryStorage::new();
    storage.set_item(BOOKMARKS_KEY, r#"["2","2","4"]"#)?;
    let set = BookmarkSet::load(&storage);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec!["2", "4"]);
    Ok(())
}

#[test]
fn listing_buttons_reflect_their_own_chapter() -> Result<()> {
    let storage = MemoryStorage::new();
    storage.set_item(BOOKMARKS_KEY, r#"["2"]"#)?;
    let mut page = Page::builder("https://reader.github.io/Book1--CS---Systems-Design/index.html")
        .html(LISTING_HTML)
        .storage(storage.clone())
        .build()?;

    page.assert_class(r#"[data-chapter="2"] .bookmark-btn"#, "bookmarked", true)?;
    page.assert_class(r#"[data-chapter="1"] .bookmark-btn"#, "bookmarked", false)?;

    page.click(r#"[data-chapter="12"] .bookmark-btn"#)?;
    assert_eq!(storage.get_item(BOOKMARKS_KEY).as_deref(), Some(r#"["2","12"]"#));
    page.assert_text(r#"[data-chapter="12"] .bookmark-btn"#, "★")?;
    page.assert_text(r#"[data-chapter="2"] .bookmark-btn"#, "★")?;
    page.assert_text(r#"[data-chapter="1"] .bookmark-btn"#, "☆")?;
    Ok(())
}

#[test]
fn chapter_urls_are_zero_padded() {
    assert_eq!(chapter_url("/", 1), "/01-chapter-1.html");
    assert_eq!(chapter_url("/Book1_CS/book-website/", 9), "/Book1_CS/book-website/09-chapter-9.html");
    assert_eq!(chapter_url("/", 14), "/14-chapter-14.html");
}

#[test]
fn navigator_respects_the_chapter_range() {
    let first = ChapterNavigator::new("/", 1, 1, 14);
    assert_eq!(first.previous(), None);
    assert_eq!(first.next().as_deref(), Some("/02-chapter-2.html"));

    let last = ChapterNavigator::new("/", 14, 1, 14);
    assert_eq!(last.next(), None);
    assert_eq!(last.previous().as_deref(), Some("/13-chapter-13.html"));

    assert_eq!(last.go_to(0), None);
    assert_eq!(last.go_to(15), None);
    assert_eq!(last.go_to(7).as_deref(), Some("/07-chapter-7.html"));
}

#[test]
fn prev_and_next_buttons_point_at_neighbours() -> Result<()> {
    let page = chapter_page()?;
    page.assert_attr(".btn-secondary", "href", "/Book1--CS---Systems-Design/02-chapter-2.html")?;
    page.assert_attr(".btn-primary", "href", "/Book1--CS---Systems-Design/04-chapter-4.html")?;

    let first = chapter_page_for(1)?;
    first.assert_attr(".btn-secondary", "href", "#")?;
    first.assert_attr(".btn-primary", "href", "/Book1--CS---Systems-Design/02-chapter-2.html")?;

    let last = chapter_page_for(14)?;
    last.assert_attr(".btn-secondary", "href", "/Book1--CS---Systems-Design/13-chapter-13.html")?;
    last.assert_attr(".btn-primary", "href", "#")?;
    Ok(())
}

#[test]
fn ctrl_arrows_navigate_between_chapters() -> Result<()> {
    let mut page = chapter_page()?;
    page.key_down(KeyEvent::new("ArrowRight").with_ctrl())?;
    page.key_down(KeyEvent::new("ArrowLeft").with_ctrl())?;
    page.key_down(KeyEvent::new("ArrowRight"))?;
    assert_eq!(
        page.take_navigations(),
        vec![
            "/Book1--CS---Systems-Design/04-chapter-4.html".to_string(),
            "/Book1--CS---Systems-Design/02-chapter-2.html".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn navigation_stops_at_both_ends() -> Result<()> {
    let mut first = chapter_page_for(1)?;
    first.key_down(KeyEvent::new("ArrowLeft").with_ctrl())?;
    assert!(!first.navigate_previous());
    assert!(first.take_navigations().is_empty());

    let mut last = chapter_page_for(14)?;
    last.key_down(KeyEvent::new("ArrowRight").with_ctrl())?;
    assert!(!last.navigate_next());
    assert!(last.take_navigations().is_empty());
    assert_eq!(last.current_chapter(), Some(14));
    Ok(())
}

#[test]
fn chapter_link_navigates_to_the_number_in_its_text() -> Result<()> {
    let mut page = Page::from_html("http://localhost:8000/index.html", LISTING_HTML)?;
    page.click(r#"[data-chapter="12"] .chapter-link"#)?;
    assert_eq!(page.take_navigations(), vec!["/12-chapter-12.html".to_string()]);

    assert!(!page.navigate_to_chapter(15));
    assert!(page.navigate_to_chapter(2));
    assert_eq!(page.last_navigation(), Some("/02-chapter-2.html"));
    Ok(())
}

#[test]
fn plain_links_follow_their_rewritten_href() -> Result<()> {
    let mut page = chapter_page()?;
    page.click(".btn-primary")?;
    assert_eq!(
        page.take_navigations(),
        vec!["/Book1--CS---Systems-Design/04-chapter-4.html".to_string()]
    );
    assert_eq!(
        page.resolve_url("/Book1--CS---Systems-Design/04-chapter-4.html")?,
        "https://reader.github.io/Book1--CS---Systems-Design/04-chapter-4.html"
    );
    Ok(())
}

#[test]
fn chapter_id_defaults_when_page_has_no_number() -> Result<()> {
    let page = Page::from_html("http://localhost/notes.html", "<p>No chapter here</p>")?;
    let session = page
        .session()
        .ok_or_else(|| Error::Dom("controller not started".into()))?;
    assert_eq!(session.chapter_id(), "1");
    assert_eq!(session.current_chapter(), 1);
    assert_eq!(session.config().base_path(), "/");
    Ok(())
}
