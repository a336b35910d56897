//! Content transformation.
//!
//! Converts a unit's raw body into render-ready markup, dispatching on the
//! source extension. Markdown goes through pulldown-cmark; HTML and
//! template sources pass through unchanged.

use pulldown_cmark::{Options, Parser, html};

pub const MARKDOWN_EXT: &str = "md";
pub const HTML_EXT: &str = "html";
pub const TEMPLATE_EXT: &str = "tmpl";

/// Returns true if the extension is one of the recognized source types.
pub fn recognized(extension: &str) -> bool {
    matches!(extension, MARKDOWN_EXT | HTML_EXT | TEMPLATE_EXT)
}

/// Transform a unit body into render-ready markup.
///
/// The discoverer excludes unrecognized extensions, so any other value
/// reaching this point is an internal invariant violation.
pub fn transform(extension: &str, body: &str) -> String {
    match extension {
        MARKDOWN_EXT => to_html(body),
        HTML_EXT | TEMPLATE_EXT => body.to_string(),
        other => unreachable!("transform received unexpected extension: {other}"),
    }
}

/// Render markdown to HTML using pulldown-cmark.
fn to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(markdown, options);

    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}
