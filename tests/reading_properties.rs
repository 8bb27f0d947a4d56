use book_site_runtime::{
    BookmarkSet, ChapterNavigator, MemoryStorage, Page, chapter_url, reading_progress,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const READING_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/reading_properties.txt";
const DEFAULT_READING_PROPTEST_CASES: u32 = 96;

const SEARCHABLE_HTML: &str = r#"<main class="chapter-content">
<section id="a"><p>Caching layers trade memory for latency.</p></section>
<section id="b"><p>Cache <em>invalidation</em> is hard; a cache miss costs a round trip.</p></section>
</main>
<input class="search-input">"#;

fn reading_proptest_cases() -> u32 {
    std::env::var("BOOK_SITE_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_READING_PROPTEST_CASES)
}

fn fail(err: book_site_runtime::Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

fn query_strategy() -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('c'),
            Just('e'),
            Just('h'),
            Just('C'),
            Just(' '),
            Just('.'),
            Just('*'),
            Just('('),
            Just('['),
            Just('\\'),
        ],
        0..=6,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

fn assert_search_leaves_text_intact(queries: &[String]) -> TestCaseResult {
    let mut page = Page::from_html("http://localhost/05-chapter-5.html", SEARCHABLE_HTML)
        .map_err(fail)?;
    let original_text = page.text(".chapter-content").map_err(fail)?;
    let original_dom = page.dump_dom(".chapter-content").map_err(fail)?;

    for (step, query) in queries.iter().enumerate() {
        page.type_text(".search-input", query).map_err(fail)?;
        page.flush().map_err(fail)?;
        prop_assert_eq!(
            page.text(".chapter-content").map_err(fail)?,
            original_text.clone(),
            "text changed at step {} for query {:?}",
            step,
            query
        );
        let marks = page.count(".search-highlight").map_err(fail)?;
        if query.chars().count() < 2 {
            prop_assert_eq!(marks, 0, "short query {:?} highlighted", query);
        }
    }

    page.type_text(".search-input", "").map_err(fail)?;
    page.flush().map_err(fail)?;
    prop_assert_eq!(page.dump_dom(".chapter-content").map_err(fail)?, original_dom);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: reading_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(READING_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn progress_stays_in_range_and_grows_with_scroll(
        document_height in 0.0f64..20_000.0,
        viewport_height in 1.0f64..2_000.0,
        first in -500.0f64..20_000.0,
        step in 0.0f64..5_000.0,
    ) {
        let low = reading_progress(first, document_height, viewport_height);
        let high = reading_progress(first + step, document_height, viewport_height);
        prop_assert!((0.0..=100.0).contains(&low));
        prop_assert!((0.0..=100.0).contains(&high));
        prop_assert!(low <= high);
    }

    #[test]
    fn toggling_twice_restores_the_bookmark_set(
        existing in vec(1u32..=14, 0..8),
        chapter in 1u32..=14,
    ) {
        let mut set = BookmarkSet::new();
        for id in &existing {
            set.insert(&id.to_string());
        }
        let before = set.clone();
        let id = chapter.to_string();

        let added = set.toggle(&id);
        prop_assert_eq!(added, !before.contains(&id));
        prop_assert_eq!(set.contains(&id), added);
        set.toggle(&id);
        prop_assert_eq!(set.contains(&id), before.contains(&id));
        prop_assert_eq!(set.len(), before.len());

        let storage = MemoryStorage::new();
        set.save(&storage).map_err(fail)?;
        let reloaded = BookmarkSet::load(&storage);
        prop_assert_eq!(reloaded.iter().collect::<Vec<_>>(), set.iter().collect::<Vec<_>>());
    }

    #[test]
    fn navigation_never_leaves_the_book(
        first in 1u32..5,
        span in 0u32..20,
        offset in 0u32..20,
        target in 0u32..40,
    ) {
        let last = first + span;
        let current = first + offset.min(span);
        let navigator = ChapterNavigator::new("/book/", current, first, last);

        match navigator.previous() {
            Some(url) => prop_assert_eq!(url, chapter_url("/book/", current - 1)),
            None => prop_assert_eq!(current, first),
        }
        match navigator.next() {
            Some(url) => prop_assert_eq!(url, chapter_url("/book/", current + 1)),
            None => prop_assert_eq!(current, last),
        }
        prop_assert_eq!(
            navigator.go_to(target).is_some(),
            (first..=last).contains(&target)
        );
    }

    #[test]
    fn search_never_changes_the_chapter_text(queries in vec(query_strategy(), 1..=8)) {
        assert_search_leaves_text_intact(&queries)?;
    }
}
