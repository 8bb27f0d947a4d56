use super::*;

mod bookmarks_and_navigation;
mod dom_and_selectors;
mod paths_and_config;

const HOSTED_CHAPTER_3: &str =
    "https://reader.github.io/Book1--CS---Systems-Design/03-chapter-3.html";

const CHAPTER_HTML: &str = r##"<!DOCTYPE html>
<html>
<head>
<link rel="stylesheet" href="css/style.css">
<script src="js/script.js"></script>
</head>
<body>
<nav class="site-nav"><button class="nav-toggle">Menu</button><ul class="nav-menu"><li><a href="index.html">Home</a></li></ul></nav>
<div class="progress-bar"><div class="progress-fill"></div></div>
<span class="progress-text">0% Complete</span>
<header><span class="chapter-number">Chapter 3</span><button class="bookmark-btn">☆</button><button class="print-btn btn">Print</button></header>
<aside class="table-of-contents"><nav class="toc-nav"><a href="#intro">Intro</a><a href="#design">Design</a></nav></aside>
<main id="main-content" class="chapter-content">
<section id="intro" class="content-section"><p>Systems design starts with requirements.</p></section>
<section id="design" class="content-section"><p>Design the <em>system</em> for scale.</p><pre><code>fn main() {}</code></pre></section>
</main>
<a class="btn btn-secondary" href="#">Previous</a>
<a class="btn btn-primary" href="#">Next</a>
<input class="search-input">
</body>
</html>"##;

/// Chapter 3 on a project site: 1280x800 window over a 2800px document.
fn chapter_page() -> Result<Page> {
    Page::builder(HOSTED_CHAPTER_3)
        .html(CHAPTER_HTML)
        .document_height(2800.0)
        .build()
}

fn chapter_page_with_storage(storage: &MemoryStorage) -> Result<Page> {
    Page::builder(HOSTED_CHAPTER_3)
        .html(CHAPTER_HTML)
        .document_height(2800.0)
        .storage(storage.clone())
        .build()
}

fn console_messages(page: &mut Page, level: ConsoleLevel) -> Vec<String> {
    page.take_console()
        .into_iter()
        .filter(|entry| entry.level == level)
        .map(|entry| entry.message)
        .collect()
}
