//! Readable-content extraction from a parsed page
//!
//! Picks the region most likely to hold the page's main content, strips
//! navigation/ads/boilerplate from a private clone of the tree, and returns
//! normalized plain text. The input document is never mutated.

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use thiserror::Error;

use crate::text::{collapse_blank_lines, rendered_text};

/// Minimum rendered-text length for a candidate region to qualify.
const MIN_CONTENT_LEN: usize = 200;

/// A candidate rule: a CSS selector whose first match qualifies when its
/// rendered text is longer than `min_len` characters.
struct CandidateRule {
    selector: &'static str,
    min_len: usize,
}

/// Priority-ordered candidate rules, best first.
const CANDIDATE_RULES: &[CandidateRule] = &[
    CandidateRule { selector: "article", min_len: MIN_CONTENT_LEN },
    CandidateRule { selector: "[role=\"main\"]", min_len: MIN_CONTENT_LEN },
    CandidateRule { selector: "main", min_len: MIN_CONTENT_LEN },
    CandidateRule { selector: ".post-content", min_len: MIN_CONTENT_LEN },
    CandidateRule { selector: "#content", min_len: MIN_CONTENT_LEN },
    CandidateRule { selector: "#main", min_len: MIN_CONTENT_LEN },
];

/// Elements stripped from the working clone before the text is read.
/// Unordered: every rule is applied to the whole candidate subtree.
const NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "svg",
    "nav",
    "footer",
    "header",
    "aside",
    "[role=\"navigation\"]",
    "[role=\"banner\"]",
    "[role=\"contentinfo\"]",
    ".ads",
    ".cookie",
    ".popup",
    "#sidebar",
    ".share-buttons",
    ".comments",
];

/// Errors from the extraction pipeline.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    /// The tree has no element to extract from (e.g. a detached root).
    #[error("document has no root element")]
    InvalidInput,
}

/// Outcome of one noise-removal pass. Rule failures are non-fatal and the
/// remaining rules still run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    /// Number of elements detached from the working clone.
    pub removed: usize,
    /// Rules that could not be applied.
    pub failures: Vec<RuleFailure>,
}

/// A noise rule that failed to apply.
#[derive(Debug, Clone, Serialize)]
pub struct RuleFailure {
    pub rule: &'static str,
    pub reason: String,
}

/// Extraction output plus the noise-removal report.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub text: String,
    pub report: CleanReport,
}

/// Extract the readable content of a parsed page as normalized plain text.
///
/// Synchronous and deterministic; the input tree is only read. The result has
/// at most one blank line between paragraphs and no surrounding whitespace.
pub fn extract(document: &Html) -> Result<String, ExtractError> {
    extract_with_report(document).map(|extraction| extraction.text)
}

/// Like [`extract`], but also returns the noise-removal report.
pub fn extract_with_report(document: &Html) -> Result<Extraction, ExtractError> {
    let candidate = select_candidate(document)?;
    let (clone, report) = strip_noise(document, candidate);
    let root = element_in(&clone, candidate).ok_or(ExtractError::InvalidInput)?;
    let text = collapse_blank_lines(&rendered_text(root));
    Ok(Extraction { text, report })
}

/// First `<title>` text of the document, trimmed. `None` when the title is
/// missing or empty.
pub fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?;
    let text = title.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Walk the candidate rules in priority order; fall back to the document body
/// so that selection never comes up empty.
fn select_candidate(document: &Html) -> Result<NodeId, ExtractError> {
    for rule in CANDIDATE_RULES {
        let Ok(selector) = Selector::parse(rule.selector) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            if rendered_text(element).chars().count() > rule.min_len {
                log::debug!("candidate region matched by `{}`", rule.selector);
                return Ok(element.id());
            }
        }
    }
    log::debug!("no candidate rule qualified, falling back to body");
    document_body(document).ok_or(ExtractError::InvalidInput)
}

fn document_body(document: &Html) -> Option<NodeId> {
    let body = Selector::parse("body").ok()?;
    if let Some(element) = document.select(&body).next() {
        return Some(element.id());
    }
    // No body at all (e.g. a fragment): take the first root element.
    document
        .tree
        .root()
        .children()
        .find_map(ElementRef::wrap)
        .map(|element| element.id())
}

/// Clone the tree and detach every noise match under the candidate node.
/// Each rule is best-effort: a failure is recorded and the rest continue.
fn strip_noise(document: &Html, candidate: NodeId) -> (Html, CleanReport) {
    let mut clone = document.clone();
    let mut report = CleanReport::default();
    for &rule in NOISE_SELECTORS {
        let selector = match Selector::parse(rule) {
            Ok(selector) => selector,
            Err(err) => {
                log::warn!("skipping noise rule `{rule}`: {err}");
                report.failures.push(RuleFailure {
                    rule,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let matches: Vec<NodeId> = match element_in(&clone, candidate) {
            Some(root) => root.select(&selector).map(|element| element.id()).collect(),
            None => {
                log::warn!("candidate node missing from clone while applying `{rule}`");
                report.failures.push(RuleFailure {
                    rule,
                    reason: "candidate node missing from clone".to_string(),
                });
                continue;
            }
        };
        for id in matches {
            if let Some(mut node) = clone.tree.get_mut(id) {
                node.detach();
                report.removed += 1;
            }
        }
    }
    (clone, report)
}

fn element_in(document: &Html, id: NodeId) -> Option<ElementRef<'_>> {
    document.tree.get(id).and_then(ElementRef::wrap)
}
