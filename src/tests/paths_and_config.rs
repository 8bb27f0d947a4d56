use super::*;

#[test]
fn hosted_domain_with_repository_marker_selects_its_prefix() {
    let rules = HostingRules::default();
    let config = SiteConfig::resolve(
        "foo.github.io",
        "/Book1--CS---Systems-Design/01-chapter-1.html",
        &rules,
    );
    assert_eq!(config.base_path(), "/Book1--CS---Systems-Design/");
    assert!(config.is_hosted_mode());

    let config = SiteConfig::resolve("naruto45.github.io", "/Book1_CS/book-website/index.html", &rules);
    assert_eq!(config.base_path(), "/Book1_CS/book-website/");
    assert!(config.is_hosted_mode());
}

#[test]
fn hosted_domain_without_marker_falls_back_to_root() {
    let config = SiteConfig::resolve("foo.github.io", "/other-book/index.html", &HostingRules::default());
    assert_eq!(config.base_path(), "/");
    assert!(config.is_hosted_mode());
}

#[test]
fn other_hosts_always_use_root() {
    let rules = HostingRules::default();
    for (host, path) in [
        ("localhost", "/Book1--CS---Systems-Design/01-chapter-1.html"),
        ("127.0.0.1", "/Book1_CS/book-website/"),
        ("books.example.com", "/"),
    ] {
        let config = SiteConfig::resolve(host, path, &rules);
        assert_eq!(config.base_path(), "/", "host {host}");
        assert!(!config.is_hosted_mode(), "host {host}");
    }
}

#[test]
fn first_matching_marker_wins() {
    let rules = HostingRules::default();
    let config = SiteConfig::resolve(
        "reader.github.io",
        "/Book1_CS/book-website/Book1--CS---Systems-Design/x.html",
        &rules,
    );
    assert_eq!(config.base_path(), "/Book1--CS---Systems-Design/");
}

#[test]
fn known_hostnames_count_as_hosted_without_suffix() {
    let rules = HostingRules {
        hosted_suffix: String::new(),
        ..HostingRules::default()
    };
    assert!(rules.is_hosted("russellpowers.github.io"));
    assert!(!rules.is_hosted("someone.github.io"));
}

#[test]
fn page_rewrites_relative_references_under_project_prefix() -> Result<()> {
    let page = chapter_page()?;
    page.assert_attr("link", "href", "/Book1--CS---Systems-Design/css/style.css")?;
    page.assert_attr("link", "data-original-href", "css/style.css")?;
    page.assert_attr("script", "src", "/Book1--CS---Systems-Design/js/script.js")?;
    page.assert_attr(".nav-menu a", "href", "/Book1--CS---Systems-Design/index.html")?;
    page.assert_attr(".toc-nav a", "href", "#intro")?;
    Ok(())
}

#[test]
fn local_pages_rewrite_under_root() -> Result<()> {
    let page = Page::from_html(
        "http://localhost:8000/03-chapter-3.html",
        r#"<link href="css/style.css"><img src="images/diagram.png"><a href="./about.html">About</a>"#,
    )?;
    assert_eq!(page.site_config().base_path(), "/");
    assert!(!page.site_config().is_hosted_mode());
    page.assert_attr("link", "href", "/css/style.css")?;
    page.assert_attr("img", "src", "/images/diagram.png")?;
    page.assert_attr("a:not(.skip-link)", "href", "/about.html")?;
    Ok(())
}

#[test]
fn second_pass_only_touches_late_elements() -> Result<()> {
    let mut page = Page::builder(HOSTED_CHAPTER_3)
        .html(r#"<head><link href="css/style.css"></head><body><main class="chapter-content"></main></body>"#)
        .defer_content_loaded()
        .build()?;
    assert_eq!(page.ready_state(), ReadyState::Loading);
    page.assert_attr("link", "href", "/Book1--CS---Systems-Design/css/style.css")?;

    page.append_html(
        ".chapter-content",
        r#"<img src="images/a.png"><a href="./04-chapter-4.html">Next</a><a href="https://example.com/0">Out</a>"#,
    )?;
    page.finish_loading()?;
    assert_eq!(page.ready_state(), ReadyState::Complete);

    page.assert_attr("link", "href", "/Book1--CS---Systems-Design/css/style.css")?;
    page.assert_attr("img", "src", "/Book1--CS---Systems-Design/images/a.png")?;
    page.assert_attr(
        ".chapter-content a",
        "href",
        "/Book1--CS---Systems-Design/04-chapter-4.html",
    )?;
    page.assert_attr(".chapter-content a", "data-original-href", "./04-chapter-4.html")?;
    assert_eq!(
        page.attr(r#"a[href^="https"]"#, "href")?.as_deref(),
        Some("https://example.com/0")
    );

    page.finish_loading()?;
    page.assert_attr("img", "src", "/Book1--CS---Systems-Design/images/a.png")?;
    Ok(())
}

#[test]
fn rewriter_skips_pairs_it_already_processed() -> Result<()> {
    let mut dom = html::parse_html(r#"<img src="images/a.png"><a href="0-intro.html">x</a>"#)?;
    let config = SiteConfig::resolve("x.github.io", "/Book1_CS/book-website/", &HostingRules::default());
    let mut rewriter = paths::PathRewriter::new();
    assert_eq!(rewriter.apply(&mut dom, &config)?, 2);
    assert_eq!(rewriter.apply(&mut dom, &config)?, 0);

    let img = dom.query_selector("img")?.ok_or_else(|| Error::SelectorNotFound("img".into()))?;
    assert_eq!(
        dom.attr(img, "src").as_deref(),
        Some("/Book1_CS/book-website/images/a.png")
    );
    Ok(())
}

#[test]
fn reader_options_fill_missing_fields_with_defaults() -> Result<()> {
    let options = ReaderOptions::from_json(
        r#"{"last_chapter": 20, "hosting": {"hosted_suffix": "example.org"}}"#,
    )?;
    assert_eq!(options.last_chapter, 20);
    assert_eq!(options.first_chapter, 1);
    assert_eq!(options.scroll_throttle_ms, 100);
    assert_eq!(options.search_debounce_ms, 300);
    assert_eq!(options.hosting.hosted_suffix, "example.org");
    assert_eq!(options.hosting.hosted_hostnames.len(), 2);
    assert_eq!(options.hosting.repository_markers.len(), 2);
    Ok(())
}

#[test]
fn reader_options_reject_invalid_documents() {
    for src in [
        "not json",
        r#"{"first_chapter": 0}"#,
        r#"{"first_chapter": 5, "last_chapter": 4}"#,
        r#"{"scroll_throttle_ms": -1}"#,
    ] {
        match ReaderOptions::from_json(src) {
            Err(Error::Config(_)) => {}
            other => panic!("expected config error for {src}: {other:?}"),
        }
    }
}

#[test]
fn custom_markers_drive_the_page_base_path() -> Result<()> {
    let options = ReaderOptions::from_json(
        r#"{"hosting": {"hosted_suffix": "pages.dev", "repository_markers": [{"marker": "handbook", "base_path": "/handbook/"}]}}"#,
    )?;
    let page = Page::builder("https://docs.pages.dev/handbook/01-chapter-1.html")
        .html(r#"<link href="css/site.css">"#)
        .options(options)
        .build()?;
    assert_eq!(page.site_config().base_path(), "/handbook/");
    page.assert_attr("link", "href", "/handbook/css/site.css")?;
    Ok(())
}

#[test]
fn invalid_page_url_is_rejected() {
    match Page::from_html("not a url", "<p></p>") {
        Err(Error::InvalidUrl(url)) => assert_eq!(url, "not a url"),
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("page built from an invalid url"),
    }
}
