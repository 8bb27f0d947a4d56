use super::*;
use crate::dom::Dom;
use crate::location::LocationParts;

fn parse(html: &str) -> Result<Dom> {
    html::parse_html(html)
}

fn first(dom: &Dom, selector: &str) -> Result<crate::dom::NodeId> {
    dom.query_selector(selector)?
        .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
}

#[test]
fn parser_keeps_structure_and_skips_comments() -> Result<()> {
    let dom = parse(
        r#"<!DOCTYPE html><!-- header --><div id="a" class="x y"><p>one<br>two</p><img src="a.png"></div>"#,
    )?;
    let div = first(&dom, "#a")?;
    assert_eq!(
        dom.dump_node(div),
        r#"<div class="x y" id="a"><p>one<br>two</p><img src="a.png"></div>"#
    );
    assert_eq!(dom.text_content(div), "onetwo");
    Ok(())
}

#[test]
fn entities_decode_in_text() -> Result<()> {
    let dom = parse("<p>Fish &amp; chips &lt;3 &#169; &#x2014; &bogus;</p>")?;
    let p = first(&dom, "p")?;
    assert_eq!(dom.text_content(p), "Fish & chips <3 © — &bogus;");
    Ok(())
}

#[test]
fn script_contents_stay_raw() -> Result<()> {
    let dom = parse("<script>if (a < b) { go('<p>'); }</script><p>after</p>")?;
    assert_eq!(dom.query_selector_all("p")?.len(), 1);
    let script = first(&dom, "script")?;
    assert_eq!(dom.text_content(script), "if (a < b) { go('<p>'); }");
    Ok(())
}

#[test]
fn unclosed_comment_is_a_parse_error() {
    match parse("<p>x</p><!-- never closed") {
        Err(Error::HtmlParse(_)) => {}
        other => panic!("expected parse error: {other:?}"),
    }
}

#[test]
fn selectors_cover_classes_attributes_and_combinators() -> Result<()> {
    let dom = parse(
        r##"<nav class="toc-nav"><a href="#intro" class="active">I</a><a href="#design">D</a></nav>
<ul><li data-chapter="2"><span><a class="chapter-link" href="02-chapter-2.html">2</a></span></li></ul>"##,
    )?;
    assert_eq!(dom.query_selector_all(".toc-nav a")?.len(), 2);
    assert_eq!(dom.query_selector_all(".toc-nav > a")?.len(), 2);
    assert_eq!(dom.query_selector_all("li > a")?.len(), 0);
    assert_eq!(dom.query_selector_all("li a")?.len(), 1);
    assert_eq!(dom.query_selector_all(r##"a[href^="#"]"##)?.len(), 2);
    assert_eq!(dom.query_selector_all(r#"a[href$=".html"]"#)?.len(), 1);
    assert_eq!(dom.query_selector_all(r#"a[href*="chapter"]"#)?.len(), 1);
    assert_eq!(dom.query_selector_all("[data-chapter]")?.len(), 1);
    assert_eq!(dom.query_selector_all(r#"[data-chapter="3"]"#)?.len(), 0);
    assert_eq!(dom.query_selector_all(".toc-nav a:not(.active)")?.len(), 1);
    assert_eq!(dom.query_selector_all("nav, ul, li")?.len(), 3);
    Ok(())
}

#[test]
fn closest_walks_up_including_self() -> Result<()> {
    let dom = parse(r#"<li data-chapter="4"><button class="bookmark-btn"><span>☆</span></button></li>"#)?;
    let span = first(&dom, "span")?;
    let button = first(&dom, ".bookmark-btn")?;
    assert_eq!(dom.closest(span, ".bookmark-btn")?, Some(button));
    assert_eq!(dom.closest(button, ".bookmark-btn")?, Some(button));
    let item = dom
        .closest(span, "[data-chapter]")?
        .ok_or_else(|| Error::SelectorNotFound("[data-chapter]".into()))?;
    assert_eq!(dom.attr(item, "data-chapter").as_deref(), Some("4"));
    assert_eq!(dom.closest(span, ".missing")?, None);
    Ok(())
}

#[test]
fn unsupported_selectors_are_rejected() -> Result<()> {
    let dom = parse("<p>x</p>")?;
    for selector in ["p:hover", "", "a[href"] {
        match dom.query_selector(selector) {
            Err(Error::UnsupportedSelector(_)) => {}
            other => panic!("expected rejection of {selector:?}: {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn normalize_merges_adjacent_text_and_drops_empty_nodes() -> Result<()> {
    let mut dom = parse("<p>a</p>")?;
    let p = first(&dom, "p")?;
    let b = dom.create_detached_text("b");
    let empty = dom.create_detached_text("");
    let c = dom.create_detached_text("c");
    dom.append_child(p, b)?;
    dom.append_child(p, empty)?;
    dom.append_child(p, c)?;
    assert_eq!(dom.children(p).len(), 4);

    dom.normalize(p);
    assert_eq!(dom.children(p).len(), 1);
    assert_eq!(dom.text_content(p), "abc");
    Ok(())
}

#[test]
fn style_and_class_edits_round_trip_through_attributes() -> Result<()> {
    let mut dom = parse(r#"<div class="a" style="color: red">x</div>"#)?;
    let div = first(&dom, "div")?;
    dom.style_set(div, "width", "50%")?;
    assert_eq!(dom.style_get(div, "color").as_deref(), Some("red"));
    assert_eq!(dom.style_get(div, "width").as_deref(), Some("50%"));
    dom.style_set(div, "color", "")?;
    dom.style_set(div, "width", "")?;
    assert_eq!(dom.attr(div, "style"), None);

    assert!(dom.class_toggle(div, "b")?);
    assert!(dom.class_contains(div, "b"));
    assert!(!dom.class_toggle(div, "a")?);
    assert_eq!(dom.attr(div, "class").as_deref(), Some("b"));
    Ok(())
}

#[test]
fn insertion_that_would_create_a_cycle_fails() -> Result<()> {
    let mut dom = parse("<div><section></section></div>")?;
    let div = first(&dom, "div")?;
    let section = first(&dom, "section")?;
    match dom.append_child(section, div) {
        Err(Error::Dom(_)) => Ok(()),
        other => panic!("expected dom error: {other:?}"),
    }
}

#[test]
fn locations_parse_and_resolve_references() -> Result<()> {
    let page = LocationParts::parse("HTTPS://Reader.GitHub.io:8443/Book1_CS/book-website/./03-chapter-3.html?x=1#top")?;
    assert_eq!(page.hostname(), "reader.github.io");
    assert_eq!(page.pathname(), "/Book1_CS/book-website/03-chapter-3.html");
    assert!(page.href().ends_with("?x=1#top"));
    assert_eq!(page.origin(), "https://reader.github.io:8443");

    assert_eq!(
        page.resolve("04-chapter-4.html")?.href(),
        "https://reader.github.io:8443/Book1_CS/book-website/04-chapter-4.html"
    );
    assert_eq!(
        page.resolve("../index.html")?.href(),
        "https://reader.github.io:8443/Book1_CS/index.html"
    );
    assert_eq!(
        page.resolve("#design")?.href(),
        "https://reader.github.io:8443/Book1_CS/book-website/03-chapter-3.html?x=1#design"
    );
    assert_eq!(page.resolve("/css/style.css")?.pathname(), "/css/style.css");
    assert_eq!(page.resolve("http://localhost/a")?.hostname(), "localhost");
    Ok(())
}

#[test]
fn relative_or_schemeless_page_urls_are_invalid() {
    for url in ["03-chapter-3.html", "//reader.github.io/", "1http://x/", "mailto:someone"] {
        assert!(
            matches!(LocationParts::parse(url), Err(Error::InvalidUrl(_))),
            "{url} should be rejected"
        );
    }
}

#[test]
fn regex_helpers_find_literal_matches() -> Result<()> {
    let pattern = text_regex::escape("a+b");
    assert_eq!(pattern, "a\\+b");
    let regex = text_regex::RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()?;
    let found = regex.find_all("A+B then a+b and aab")?;
    assert_eq!(
        found.iter().map(|m| (m.start(), m.as_str())).collect::<Vec<_>>(),
        vec![(0, "A+B"), (9, "a+b")]
    );
    assert!(text_regex::RegexBuilder::new("(unclosed").build().is_err());
    Ok(())
}
