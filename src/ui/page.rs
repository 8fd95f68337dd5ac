//! Full HTML document around the chat panel.

use super::header::{APP_NAME, render_header};
use super::text;

/// Wrap `content` in the document shell.
///
/// Scripts are served locally from `/static/vendor`.
#[must_use]
pub fn render_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="A chat assistant">
    <title>{title} - {APP_NAME}</title>

    <script src="/static/vendor/htmx-2.0.8.min.js"></script>
    <script defer src="/static/vendor/alpine.min.js"></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="min-h-screen bg-background text-textPrimary antialiased">
    {header}
    <main id="app" class="flex flex-col w-full max-w-3xl pt-14 pb-60 mx-auto stretch">
        {content}
    </main>
</body>
</html>"#,
        title = text(title),
        header = render_header(),
    )
}
