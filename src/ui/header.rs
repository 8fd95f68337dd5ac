//! Page header with logo and theme toggle.

/// Application name shown in the header and title.
pub const APP_NAME: &str = "Cogno";

const LOGO_SVG: &str = r#"<svg class="w-5 h-5" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" aria-hidden="true"><circle cx="12" cy="12" r="9"/><circle cx="12" cy="12" r="3"/></svg>"#;

const SUN_SVG: &str = r#"<svg class="h-5 w-5 hidden dark:block" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" aria-hidden="true"><circle cx="12" cy="12" r="4"/><path d="M12 2v2M12 20v2M4.93 4.93l1.41 1.41M17.66 17.66l1.41 1.41M2 12h2M20 12h2M4.93 19.07l1.41-1.41M17.66 6.34l1.41-1.41"/></svg>"#;

const MOON_SVG: &str = r#"<svg class="h-5 w-5 block dark:hidden" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" aria-hidden="true"><path d="M12 3a6 6 0 0 0 9 9 9 9 0 1 1-9-9Z"/></svg>"#;

/// Render the fixed page header.
#[must_use]
pub fn render_header() -> String {
    format!(
        r#"<header class="fixed w-full p-0 md:p-2 flex justify-between items-center z-10 backdrop-blur md:backdrop-blur-none bg-background/80 md:bg-transparent">
    <div class="p-2">
        <a href="/">{LOGO_SVG}<span class="sr-only">{APP_NAME}</span></a>
    </div>
    <div class="flex flex-col items-center">
        <a href="/"><h1 class="mb-4 text-center">{APP_NAME}</h1></a>
    </div>
    {toggle}
</header>"#,
        toggle = render_theme_toggle(),
    )
}

/// Client-side light/dark switch. The choice is not persisted.
#[must_use]
pub fn render_theme_toggle() -> String {
    format!(
        r#"<button type="button" class="theme-toggle h-9 w-9 rounded-full inline-flex items-center justify-center" aria-label="Toggle theme" x-data x-on:click="document.documentElement.classList.toggle('dark')">{SUN_SVG}{MOON_SVG}</button>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_links_home_and_has_toggle() {
        let html = render_header();
        assert!(html.contains(r#"<a href="/">"#));
        assert!(html.contains("<h1 class=\"mb-4 text-center\">Cogno</h1>"));
        assert!(html.contains("Toggle theme"));
        assert!(html.contains("classList.toggle('dark')"));
    }
}
