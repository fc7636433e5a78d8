//! HTML rendering of answers for the web chat.

use docent_core::Answer;
use pulldown_cmark::{Event, Options, Parser, html};

/// Render Markdown to HTML. Raw HTML in the input is emitted as escaped text.
#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = Parser::new_ext(input, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(input.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Answer body followed by a `Source:` paragraph naming the best-ranked fragment's file.
#[must_use]
pub fn render_answer(answer: &Answer) -> String {
    let mut out = markdown_to_html(answer.text.trim());
    if let Some(source) = answer.primary_source() {
        out.push_str("<p>Source: ");
        out.push_str(&escape_html(source));
        out.push_str("</p>");
    }
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use docent_corpus::{Chunk, DocumentFormat, DocumentMetadata};

    use super::*;

    fn chunk(source: &str) -> Chunk {
        Chunk {
            content: "The sky is blue.".into(),
            metadata: DocumentMetadata::new(source, DocumentFormat::Text),
            chunk_index: 0,
        }
    }

    #[test]
    fn markdown_formatting() {
        let html = markdown_to_html("The sky is **blue**.\n\n- one\n- two");
        assert!(html.contains("<strong>blue</strong>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = markdown_to_html("hi <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn answer_with_source_paragraph() {
        let answer = Answer {
            text: "Blue.".into(),
            source_documents: vec![chunk("/srv/app/data/notes.txt"), chunk("/srv/app/data/x.txt")],
        };
        assert_eq!(
            render_answer(&answer),
            "<p>Blue.</p>\n<p>Source: notes.txt</p>"
        );
    }

    #[test]
    fn answer_without_sources_has_no_source_paragraph() {
        let answer = Answer {
            text: "I don't know.".into(),
            source_documents: Vec::new(),
        };
        let html = render_answer(&answer);
        assert!(!html.contains("Source:"));
    }

    #[test]
    fn source_is_escaped() {
        let answer = Answer {
            text: "ok".into(),
            source_documents: vec![chunk("a<b>.txt")],
        };
        assert!(render_answer(&answer).ends_with("<p>Source: a&lt;b&gt;.txt</p>"));
    }
}
