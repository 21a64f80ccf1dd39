//! URL assembly for the catalog site
//!
//! The catalog markup carries hrefs like `/catalog/bmw/3er/`. The site's link
//! convention is to drop exactly one leading character from the href and join
//! the remainder onto the catalog base URL; [`resolve_url`] reproduces that
//! literally. Blank hrefs mean "no link" and resolve to `None` rather than an
//! error.

/// Returns true if a href carries no usable link
pub fn is_blank(href: &str) -> bool {
    href.trim().is_empty()
}

/// Resolves a catalog href against the site base URL
///
/// Drops exactly one leading character from the trimmed href (the site always
/// emits a leading `/`) and joins the remainder onto `base` with a single
/// slash. Blank hrefs, and hrefs that are empty once the leading character is
/// dropped, yield `None`; callers skip these, contributing zero downstream
/// work items.
///
/// # Examples
///
/// ```
/// use motormap::url::resolve_url;
///
/// let url = resolve_url("https://auto.mail.ru/", "/catalog/bmw/3er/");
/// assert_eq!(url.as_deref(), Some("https://auto.mail.ru/catalog/bmw/3er/"));
/// assert_eq!(resolve_url("https://auto.mail.ru/", "   "), None);
/// ```
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut chars = href.chars();
    chars.next();
    let rest = chars.as_str();
    if rest.trim().is_empty() {
        return None;
    }

    Some(format!("{}/{}", base.trim_end_matches('/'), rest))
}

/// Builds the URL of one catalog search page
///
/// The search URL template already ends with the page query parameter
/// (`.../catalog/search/?page=`); the page number is appended verbatim.
pub fn catalog_page_url(search_url: &str, page: u32) -> String {
    format!("{}{}", search_url, page)
}
