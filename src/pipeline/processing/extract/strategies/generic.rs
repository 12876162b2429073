use scraper::Html;

use super::html::{
    element_text, find_location_phrase, find_phone, first_text, keyword_element, meta_content,
    tel_link_number,
};
use crate::constants::GENERIC_FAMILY;
use crate::domain::Field;
use crate::pipeline::processing::extract::{ExtractedRecord, SiteStrategy};

const NAME_SELECTORS: &[&str] = &[
    ".project-title",
    "h1.title",
    "h1",
    "h2.title",
    ".product-title",
    ".entry-title",
    "title",
];

const LOCATION_SELECTORS: &[&str] = &[
    ".project-location",
    r#"[itemprop="location"]"#,
    "span.location",
    ".location",
    ".location-info",
    ".address",
];

const TYPE_SELECTORS: &[&str] = &[
    ".project-type",
    "span.type",
    ".type",
    ".project-category",
    ".category",
    ".tags",
];

const CONTACT_NAME_SELECTORS: &[&str] = &[
    ".contact-name",
    ".contact h3",
    ".contact-info .name",
    ".author-name",
    ".owner",
];

const MOBILE_SELECTORS: &[&str] = &[".mobile-number", ".phone", ".tel"];

/// Terminal strategy for sites without a registered family.
/// Tries common class names first, then falls back to text heuristics.
pub struct GenericStrategy;

impl SiteStrategy for GenericStrategy {
    fn family(&self) -> &'static str {
        GENERIC_FAMILY
    }

    fn extract(&self, page: &Html) -> ExtractedRecord {
        let root = page.root_element();
        let mut record = ExtractedRecord::new(self.family());

        record.fill(Field::Name, first_text(root, NAME_SELECTORS));

        let location = first_text(root, LOCATION_SELECTORS)
            .or_else(|| {
                keyword_element(root, "div, span, p", &["location", "address", "place"], false)
                    .and_then(element_text)
            })
            .or_else(|| find_location_phrase(root, "p, li, span, address, dd"));
        record.fill(Field::Location, location);

        // First keyword of <meta name="keywords"> describes the site
        let project_type = first_text(root, TYPE_SELECTORS).or_else(|| {
            meta_content(root, "keywords")
                .and_then(|k| k.split(',').map(str::trim).find(|s| !s.is_empty()).map(str::to_string))
        });
        record.fill(Field::ProjectType, project_type);

        let contact_section = keyword_element(
            root,
            "section, div",
            &["contact", "get-in-touch", "reach-us"],
            true,
        );

        let contact_name = first_text(root, CONTACT_NAME_SELECTORS).or_else(|| {
            contact_section.and_then(|section| first_text(section, &["h2", "h3", "h4", "strong"]))
        });
        record.fill(Field::ContactName, contact_name);

        let mobile = first_text(root, MOBILE_SELECTORS)
            .or_else(|| tel_link_number(root))
            .or_else(|| contact_section.and_then(|section| find_phone(section, "p, span, a")))
            .or_else(|| find_phone(root, "p, span"));
        record.fill(Field::MobileNumber, mobile);

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::extract::Provenance;

    #[test]
    fn test_class_based_page() {
        let page = Html::parse_document(
            r#"<html><head><title>Ignored</title></head><body>
                <h2 class="project-title">Riverside Villas</h2>
                <div class="project-location">Omdurman</div>
                <span class="type">residential construction</span>
                <div class="contact-info"><span class="name">Mona Idris</span></div>
                <span class="phone">0912 345 678</span>
            </body></html>"#,
        );
        let record = GenericStrategy.extract(&page);
        assert_eq!(record.get(Field::Name), Some("Riverside Villas"));
        assert_eq!(record.get(Field::Location), Some("Omdurman"));
        assert_eq!(record.get(Field::ProjectType), Some("residential construction"));
        assert_eq!(record.get(Field::ContactName), Some("Mona Idris"));
        assert_eq!(record.get(Field::MobileNumber), Some("0912 345 678"));
    }

    #[test]
    fn test_relocation_is_not_a_location_phrase() {
        let page = Html::parse_document(
            "<html><body><p>Ask about our relocation Packages today</p></body></html>",
        );
        let record = GenericStrategy.extract(&page);
        assert_eq!(record.get(Field::Location), None);
        assert_eq!(record.provenance(Field::Location), Provenance::Absent);
    }

    #[test]
    fn test_text_heuristics_when_no_classes_match() {
        let page = Html::parse_document(
            r#"<html><head>
                <title>Blue Nile Tours</title>
                <meta name="keywords" content="tourism, travel">
              </head><body>
                <p>We are based in Port Sudan and run trips all year.</p>
                <div id="get-in-touch">
                  <h3>Khalid Musa</h3>
                  <p>Phone: +249 912-345-6789</p>
                </div>
            </body></html>"#,
        );
        let record = GenericStrategy.extract(&page);
        assert_eq!(record.get(Field::Name), Some("Blue Nile Tours"));
        assert_eq!(record.get(Field::Location), Some("Port Sudan"));
        assert_eq!(record.get(Field::ProjectType), Some("tourism"));
        assert_eq!(record.get(Field::ContactName), Some("Khalid Musa"));
        assert_eq!(record.get(Field::MobileNumber), Some("+249 912-345-6789"));
    }

    #[test]
    fn test_blank_page_reports_nothing() {
        let record = GenericStrategy.extract(&Html::parse_document("<html><body><div></div></body></html>"));
        assert_eq!(record.live_count(), 0);
        assert!(Field::ALL.iter().all(|f| record.provenance(*f) == Provenance::Absent));
    }
}
