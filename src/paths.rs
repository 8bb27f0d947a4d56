use std::collections::HashSet;

use crate::config::SiteConfig;
use crate::dom::{Dom, NodeId};
use crate::Result;

struct RewriteRule {
    selector: &'static str,
    attr: &'static str,
    skip_external: bool,
}

const REWRITE_RULES: &[RewriteRule] = &[
    RewriteRule {
        selector: r#"link[href^="css/"]"#,
        attr: "href",
        skip_external: false,
    },
    RewriteRule {
        selector: r#"script[src^="js/"]"#,
        attr: "src",
        skip_external: false,
    },
    RewriteRule {
        selector: r#"a[href^="./"], a[href^="0"], a[href^="index.html"], a[href^="resources.html"], a[href^="about.html"]"#,
        attr: "href",
        skip_external: true,
    },
    RewriteRule {
        selector: r#"img[src^="images/"]"#,
        attr: "src",
        skip_external: false,
    },
];

/// Prefixes relative asset and navigation references with the base path.
///
/// The rewriter may run several times over the same document. Each
/// `(element, attribute)` pair is rewritten at most once, and the declared
/// value is kept in `data-original-<attr>` so the prefix is always applied to
/// what the author wrote rather than to an earlier result.
#[derive(Debug, Default)]
pub(crate) struct PathRewriter {
    processed: HashSet<(NodeId, &'static str)>,
}

impl PathRewriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns how many references were rewritten by this pass.
    pub(crate) fn apply(&mut self, dom: &mut Dom, config: &SiteConfig) -> Result<usize> {
        let mut rewritten = 0usize;
        for rule in REWRITE_RULES {
            for node in dom.query_selector_all(rule.selector)? {
                if self.processed.contains(&(node, rule.attr)) {
                    continue;
                }
                let original_attr = format!("data-original-{}", rule.attr);
                let declared = match dom.attr(node, &original_attr) {
                    Some(declared) => declared,
                    None => match dom.attr(node, rule.attr) {
                        Some(value) => value,
                        None => continue,
                    },
                };
                if rule.skip_external && (declared.starts_with("http") || declared.starts_with('#')) {
                    continue;
                }

                let relative = declared.strip_prefix("./").unwrap_or(&declared);
                let next = format!("{}{relative}", config.base_path());
                log::trace!("rewrite {} {declared} -> {next}", rule.attr);
                dom.set_attr(node, &original_attr, &declared)?;
                dom.set_attr(node, rule.attr, &next)?;
                self.processed.insert((node, rule.attr));
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }
}
