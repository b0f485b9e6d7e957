//! Full-page layout: sidebar with the link form, chat panel with history

use crate::render::{HtmlRenderer, Renderer};
use crate::error::Result;
use crate::session::{Session, SessionPhase};

use html_escape::encode_text;
use std::path::Path;

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; display: flex; min-height: 100vh; }
aside { width: 18rem; padding: 1rem; background: #f0f2f6; }
main { flex: 1; padding: 1rem 2rem; max-width: 60rem; }
.message { margin: 0.75rem 0; padding: 0.5rem 0.75rem; border-radius: 0.5rem; }
.message.user { background: #e8f0fe; }
.message.assistant { background: #f7f7f9; }
.warning { background: #fff3cd; padding: 0.5rem; border-radius: 0.25rem; }
.suggestions form { display: inline; }
.suggestions button { margin: 0.25rem; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; }
img { max-width: 100%; }
input[type=text] { width: 100%; box-sizing: border-box; }
"#;

/// Render the whole page for `session`
///
/// The chat panel replays the full message history on every call. Images in
/// `cache_dir` link to the `/cache` route.
pub fn render_page(session: &Session, cache_dir: &Path) -> Result<String> {
    let mut renderer = HtmlRenderer::new(session.suggestions()).with_cache_dir(cache_dir);
    renderer.render_all(session.messages().all())?;
    let history = renderer.finish();

    let warning = session
        .warning()
        .map(|w| format!(r#"<p class="warning">{}</p>"#, encode_text(w)))
        .unwrap_or_default();

    let status = match session.phase() {
        // The session lock is held for the whole load, so a page never
        // observes `Loading`.
        SessionPhase::Empty | SessionPhase::Loading => "No spreadsheet loaded.".to_string(),
        SessionPhase::Loaded | SessionPhase::Ready => {
            let tables = session.dataset().map(|d| d.len()).unwrap_or(0);
            format!("Tables loaded: {}", tables)
        }
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Sheetchat</title>
<style>{style}</style>
</head>
<body>
<aside>
<h2>Spreadsheet</h2>
<form method="post" action="/load">
<input type="text" name="url" placeholder="https://docs.google.com/spreadsheets/d/...">
<button type="submit">Load</button>
</form>
<p>{status}</p>
{warning}
</aside>
<main>
<h1>Chat with your data</h1>
<section id="history">{history}</section>
<form method="post" action="/ask">
<input type="text" name="prompt" placeholder="Ask a question about the data" autofocus>
</form>
</main>
</body>
</html>
"#,
        style = STYLE,
        status = encode_text(&status),
        warning = warning,
        history = history,
    ))
}
