//! Rendered-text projection and plain-text normalization

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

/// Elements whose subtree never contributes rendered text.
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start and end their own line.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "div",
    "dl",
    "dd",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "section",
    "td",
    "th",
    "tr",
    "ul",
];

/// Elements separated from their neighbours by a blank line.
const PARAGRAPH_TAGS: &[&str] = &[
    "blockquote",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "p",
    "pre",
    "table",
];

/// Text of an element as a human would see it on screen: script/style and
/// other non-rendered subtrees contribute nothing, whitespace runs collapse
/// to single spaces, and block boundaries become line breaks.
pub fn rendered_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    render_node(*root, &mut out);
    out.trim().to_string()
}

fn render_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => push_text(&text.text, out),
        Node::Element(element) => {
            let name = element.name();
            if NON_RENDERED_TAGS.contains(&name) {
                return;
            }
            if name == "br" {
                trim_line_end(out);
                out.push('\n');
                return;
            }
            let paragraph = PARAGRAPH_TAGS.contains(&name);
            let block = paragraph || BLOCK_TAGS.contains(&name);
            if paragraph {
                push_paragraph_break(out);
            } else if block {
                push_line_break(out);
            }
            for child in node.children() {
                render_node(child, out);
            }
            if paragraph {
                push_paragraph_break(out);
            } else if block {
                push_line_break(out);
            }
        }
        _ => {}
    }
}

fn push_text(text: &str, out: &mut String) {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        // Whitespace-only node still separates words.
        if !out.is_empty() && !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        return;
    }
    if text.starts_with(char::is_whitespace)
        && !out.is_empty()
        && !out.ends_with(char::is_whitespace)
    {
        out.push(' ');
    }
    out.push_str(&collapsed);
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn trim_line_end(out: &mut String) {
    while out.ends_with(' ') || out.ends_with('\t') {
        out.pop();
    }
}

fn push_line_break(out: &mut String) {
    trim_line_end(out);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_paragraph_break(out: &mut String) {
    trim_line_end(out);
    if out.is_empty() {
        return;
    }
    while out.ends_with('\n') {
        out.pop();
    }
    out.push_str("\n\n");
}

/// Collapse every blank-line gap to exactly one blank line and trim the ends.
/// Applying this to its own output is a no-op.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_blank = false;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            if !out.is_empty() {
                pending_blank = true;
            }
            continue;
        }
        if pending_blank {
            out.push_str("\n\n");
            pending_blank = false;
        } else if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn body_of(html: &str) -> String {
        let document = Html::parse_document(html);
        let selector = Selector::parse("body").unwrap();
        let body = document.select(&selector).next().unwrap();
        rendered_text(body)
    }

    #[test]
    fn skips_script_and_style_text() {
        let text = body_of(
            "<body><p>Visible</p><script>var hidden = 1;</script><style>p { color: red }</style></body>",
        );
        assert_eq!(text, "Visible");
    }

    #[test]
    fn blocks_break_lines_and_br_breaks_unconditionally() {
        let text = body_of("<body><div>one</div><div>two<br>three</div></body>");
        assert_eq!(text, "one\ntwo\nthree");
    }

    #[test]
    fn paragraphs_get_a_blank_line() {
        let text = body_of("<body><p>first</p><p>second</p></body>");
        assert_eq!(text, "first\n\nsecond");
    }

    #[test]
    fn collapses_whitespace_runs_inside_text() {
        let text = body_of("<body><p>hello   \n   world</p></body>");
        assert_eq!(text, "hello world");
    }

    #[test]
    fn inline_elements_do_not_split_words() {
        assert_eq!(body_of("<body><p>bo<b>ld</b></p></body>"), "bold");
        assert_eq!(
            body_of("<body><p>Hello <em>world</em></p></body>"),
            "Hello world"
        );
    }

    #[test]
    fn collapse_squashes_runs_of_blank_lines() {
        let input = "para1\n\n\n\n\n\npara2";
        assert_eq!(collapse_blank_lines(input), "para1\n\npara2");
    }

    #[test]
    fn collapse_treats_whitespace_lines_as_blank() {
        assert_eq!(collapse_blank_lines("a\n   \t\nb"), "a\n\nb");
    }

    #[test]
    fn collapse_preserves_single_newlines() {
        assert_eq!(collapse_blank_lines("a\nb"), "a\nb");
    }

    #[test]
    fn collapse_trims_surrounding_whitespace() {
        assert_eq!(collapse_blank_lines("  \n\n hello world \n\n  "), "hello world");
    }

    #[test]
    fn collapse_of_whitespace_only_input_is_empty() {
        assert_eq!(collapse_blank_lines(" \n \n\t\n "), "");
    }

    #[test]
    fn collapse_is_idempotent() {
        let inputs = [
            "para1\n\n\n\n\n\npara2",
            "  a\n\nb\nc\n\n\n\nd  ",
            "single line",
            "",
        ];
        for input in inputs {
            let once = collapse_blank_lines(input);
            assert_eq!(collapse_blank_lines(&once), once);
        }
    }
}
