//! HTML renderer for the web chat panel

use super::Renderer;
use crate::dataset::Table;
use crate::error::Result;
use crate::session::{Content, ImageRef, Message, SuggestionSet};

use base64::Engine;
use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{html, Event, Parser};
use std::fmt::Write as _;
use std::path::Path;

/// Renders messages as HTML fragments
///
/// Suggestion buttons are live only while their set is still pending in the
/// session; once one is picked, earlier question sets render disabled.
///
/// File images inside the cache directory link to the `/cache` route. Any
/// other image file is read and embedded as a data URI.
pub struct HtmlRenderer<'a> {
    html: String,
    pending: Option<&'a SuggestionSet>,
    cache_dir: Option<&'a Path>,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(pending: Option<&'a SuggestionSet>) -> Self {
        Self {
            html: String::new(),
            pending,
            cache_dir: None,
        }
    }

    /// Directory served under `/cache`
    pub fn with_cache_dir(mut self, cache_dir: &'a Path) -> Self {
        self.cache_dir = Some(cache_dir);
        self
    }

    /// The accumulated HTML
    pub fn finish(self) -> String {
        self.html
    }

    fn text(&mut self, text: &str) {
        let _ = write!(self.html, "<p>{}</p>", encode_text(text).replace('\n', "<br>"));
    }

    /// Raw HTML in the source is shown as text, never passed through
    fn markdown(&mut self, text: &str) {
        let events = Parser::new(text).map(|event| match event {
            Event::Html(raw) => Event::Text(raw),
            other => other,
        });
        html::push_html(&mut self.html, events);
    }

    fn table(&mut self, table: &Table) {
        self.html.push_str("<table><thead><tr>");
        for column in table.columns() {
            let _ = write!(self.html, "<th>{}</th>", encode_text(column));
        }
        self.html.push_str("</tr></thead><tbody>");
        for row in table.rows() {
            self.html.push_str("<tr>");
            for cell in row {
                let _ = write!(self.html, "<td>{}</td>", encode_text(cell));
            }
            self.html.push_str("</tr>");
        }
        self.html.push_str("</tbody></table>");
    }

    fn image(&mut self, image: &ImageRef) {
        match image {
            ImageRef::File { path } => {
                let served = self
                    .cache_dir
                    .is_some_and(|dir| path.parent() == Some(dir));
                if served {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let _ = write!(
                        self.html,
                        r#"<img src="/cache/{}" alt="image">"#,
                        encode_double_quoted_attribute(&name)
                    );
                    return;
                }
                match std::fs::read(path) {
                    Ok(bytes) => self.image(&ImageRef::inline(bytes)),
                    Err(e) => {
                        tracing::warn!("Cannot read image {}: {}", path.display(), e);
                        let _ = write!(
                            self.html,
                            r#"<p class="warning">Image unavailable: {}</p>"#,
                            encode_text(&path.display().to_string())
                        );
                    }
                }
            }
            ImageRef::Inline { mime_type, data } => {
                let _ = write!(
                    self.html,
                    r#"<img src="data:{};base64,{}" alt="plot">"#,
                    encode_double_quoted_attribute(mime_type),
                    base64::engine::general_purpose::STANDARD.encode(data)
                );
            }
        }
    }

    fn questions(&mut self, questions: &SuggestionSet) {
        self.html.push_str(r#"<div class="suggestions">"#);
        for suggestion in questions.iter() {
            let live = self
                .pending
                .is_some_and(|pending| pending.get(&suggestion.key).is_some());
            if live {
                let _ = write!(
                    self.html,
                    r#"<form method="post" action="/suggestions/{}"><button type="submit">{}</button></form>"#,
                    encode_double_quoted_attribute(&suggestion.key),
                    encode_text(&suggestion.question)
                );
            } else {
                let _ = write!(
                    self.html,
                    r#"<button type="button" disabled>{}</button>"#,
                    encode_text(&suggestion.question)
                );
            }
        }
        self.html.push_str("</div>");
    }
}

impl Renderer for HtmlRenderer<'_> {
    fn render(&mut self, message: &Message) -> Result<()> {
        let _ = write!(
            self.html,
            r#"<div class="message {}">"#,
            message.role()
        );
        match message.content() {
            Content::Text(text) => self.text(text),
            Content::Markdown(text) => self.markdown(text),
            Content::Table(table) => self.table(table),
            Content::Image(image) => self.image(image),
            Content::Questions(questions) => self.questions(questions),
        }
        self.html.push_str("</div>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    fn render(message: Message, pending: Option<&SuggestionSet>) -> String {
        let mut renderer = HtmlRenderer::new(pending);
        renderer.render(&message).unwrap();
        renderer.finish()
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render(
            Message::new(Role::User, Content::Text("<b>hi</b>\nthere".into())),
            None,
        );
        assert_eq!(
            html,
            r#"<div class="message user"><p>&lt;b&gt;hi&lt;/b&gt;<br>there</p></div>"#
        );
    }

    #[test]
    fn test_markdown_lists_and_bold() {
        let html = render(
            Message::new(
                Role::Assistant,
                Content::Markdown("Intro\n\n**orders**\n- `id`: Order <number>".into()),
            ),
            None,
        );
        assert!(html.contains("<p>Intro</p>"));
        assert!(html.contains("<p><strong>orders</strong></p>"));
        assert!(html.contains("<li><code>id</code>: Order &lt;number&gt;</li>"));
    }

    #[test]
    fn test_markdown_headers_numbered_lists_and_links() {
        let html = render(
            Message::new(
                Role::Assistant,
                Content::Markdown(
                    "## Orders\n\n1. first\n2. second\n\nSee [docs](https://example.com)".into(),
                ),
            ),
            None,
        );
        assert!(html.contains("<h2>Orders</h2>"));
        assert!(html.contains("<ol>"));
        assert!(html.contains("<li>second</li>"));
        assert!(html.contains(r#"<a href="https://example.com">docs</a>"#));
    }

    #[test]
    fn test_markdown_raw_html_is_escaped() {
        let html = render(
            Message::new(
                Role::Assistant,
                Content::Markdown("<script>alert(1)</script>".into()),
            ),
            None,
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_table_grid() {
        let table = Table::new(
            "t",
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "<2>".into()]],
        );
        let html = render(Message::new(Role::Assistant, Content::Table(table)), None);
        assert!(html.contains("<thead><tr><th>a</th><th>b</th></tr></thead>"));
        assert!(html.contains("<tr><td>1</td><td>&lt;2&gt;</td></tr>"));
    }

    #[test]
    fn test_file_image_served_from_cache_route() {
        let message = Message::new(
            Role::Assistant,
            Content::Image(ImageRef::file("/var/tmp/cache/plantuml_img.png")),
        );
        let mut renderer = HtmlRenderer::new(None).with_cache_dir(Path::new("/var/tmp/cache"));
        renderer.render(&message).unwrap();
        let html = renderer.finish();
        assert!(html.contains(r#"<img src="/cache/plantuml_img.png""#));
        assert!(!html.contains("/var/tmp"));
    }

    #[test]
    fn test_file_image_outside_cache_is_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let chart = dir.path().join("temp_chart.png");
        std::fs::write(&chart, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();

        let html = render(
            Message::new(Role::Assistant, Content::Image(ImageRef::file(&chart))),
            None,
        );
        assert!(html.contains("data:image/png;base64,"));
        assert!(!html.contains("/cache/"));
    }

    #[test]
    fn test_missing_image_file_renders_notice() {
        let html = render(
            Message::new(
                Role::Assistant,
                Content::Image(ImageRef::file("exports/charts/<missing>.png")),
            ),
            None,
        );
        assert!(html.contains("Image unavailable: exports/charts/&lt;missing&gt;.png"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_inline_image_data_uri() {
        let html = render(
            Message::new(
                Role::Assistant,
                Content::Image(ImageRef::Inline {
                    mime_type: "image/png".into(),
                    data: vec![1, 2, 3],
                }),
            ),
            None,
        );
        assert!(html.contains("data:image/png;base64,AQID"));
    }

    #[test]
    fn test_pending_questions_are_buttons() {
        let set = SuggestionSet::from_questions(vec!["How many?".into()]);
        let key = set.nth(0).unwrap().key.clone();
        let html = render(
            Message::new(Role::Assistant, Content::Questions(set.clone())),
            Some(&set),
        );
        assert!(html.contains(&format!(r#"action="/suggestions/{}""#, key)));
        assert!(html.contains(">How many?</button>"));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn test_consumed_questions_are_disabled() {
        let set = SuggestionSet::from_questions(vec!["How many?".into()]);
        let html = render(Message::new(Role::Assistant, Content::Questions(set)), None);
        assert!(html.contains("disabled"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn test_render_all_twice_is_stable() {
        let messages = vec![
            Message::new(Role::User, Content::Text("a".into())),
            Message::new(Role::Assistant, Content::Text("b".into())),
        ];
        let first = {
            let mut r = HtmlRenderer::new(None);
            r.render_all(&messages).unwrap();
            r.finish()
        };
        let second = {
            let mut r = HtmlRenderer::new(None);
            r.render_all(&messages).unwrap();
            r.finish()
        };
        assert_eq!(first, second);
        assert_eq!(messages.len(), 2);
    }
}
