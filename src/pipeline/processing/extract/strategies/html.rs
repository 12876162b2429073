//! Markup helpers shared by the site-family strategies.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::pipeline::processing::normalize::text::collapse_whitespace;

/// Phone-number-like token: optional country prefix, then 3-3-4 digit groups
pub static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("phone pattern")
});

/// "Location: Riyadh", "Based in Khartoum North", "Address: Al Olaya, Riyadh"
pub static LOCATION_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?i:location|address|based in|located in)\b\s*[:\-]?\s*(\p{Lu}[\p{L}.'-]*(?:(?:,\s*|\s+)\p{Lu}[\p{L}.'-]*){0,4})",
    )
    .expect("location pattern")
});

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Whitespace-collapsed text of an element, if any
pub fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = collapse_whitespace(&element.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// Text of the first element with content, trying selectors in order
pub fn first_text(scope: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let sel = selector(css)?;
        scope.select(&sel).find_map(element_text)
    })
}

/// First element matching any selector, tried in order
pub fn first_element<'a>(scope: ElementRef<'a>, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|css| {
        let sel = selector(css)?;
        let found = scope.select(&sel).next();
        found
    })
}

/// Number behind a `tel:` link; the link text when present, otherwise the href
pub fn tel_link_number(scope: ElementRef<'_>) -> Option<String> {
    let sel = selector(r#"a[href^="tel:"]"#)?;
    scope.select(&sel).find_map(|link| {
        element_text(link).or_else(|| {
            link.value()
                .attr("href")
                .and_then(|href| href.strip_prefix("tel:"))
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
        })
    })
}

/// First phone-number-like token in the text of `containers` under `scope`
pub fn find_phone(scope: ElementRef<'_>, containers: &str) -> Option<String> {
    let sel = selector(containers)?;
    scope.select(&sel).find_map(|el| {
        let text = element_text(el)?;
        PHONE_PATTERN.find(&text).map(|m| m.as_str().trim().to_string())
    })
}

/// First location phrase in the text of `containers` under `scope`
pub fn find_location_phrase(scope: ElementRef<'_>, containers: &str) -> Option<String> {
    let sel = selector(containers)?;
    scope.select(&sel).find_map(|el| {
        let text = element_text(el)?;
        LOCATION_PHRASE
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim_end_matches([',', '.']).to_string())
    })
}

/// First element among `tags` whose id or class contains one of the keywords
pub fn keyword_element<'a>(
    scope: ElementRef<'a>,
    tags: &str,
    keywords: &[&str],
    match_id: bool,
) -> Option<ElementRef<'a>> {
    let sel = selector(tags)?;
    keywords.iter().find_map(|keyword| {
        scope.select(&sel).find(|el| {
            let value = el.value();
            let in_class = value.classes().any(|c| c.to_ascii_lowercase().contains(keyword));
            let in_id = match_id
                && value
                    .id()
                    .is_some_and(|id| id.to_ascii_lowercase().contains(keyword));
            in_class || in_id
        })
    })
}

/// `content` attribute of `<meta name="...">`
pub fn meta_content(scope: ElementRef<'_>, name: &str) -> Option<String> {
    let sel = selector(&format!(r#"meta[name="{name}"]"#))?;
    scope
        .select(&sel)
        .find_map(|m| m.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|c| !c.is_empty())
}
