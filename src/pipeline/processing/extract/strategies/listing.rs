use scraper::Html;

use super::html::{first_element, first_text, tel_link_number};
use crate::constants::{LISTING_FAMILY, LISTING_PROJECT_TYPE};
use crate::domain::Field;
use crate::pipeline::processing::extract::{ExtractedRecord, SiteStrategy};

/// Classified listing pages (vehicle marketplaces such as sudancar.com)
pub struct ListingStrategy;

impl SiteStrategy for ListingStrategy {
    fn family(&self) -> &'static str {
        LISTING_FAMILY
    }

    fn extract(&self, page: &Html) -> ExtractedRecord {
        let root = page.root_element();
        let mut record = ExtractedRecord::new(self.family());

        record.fill(Field::Name, first_text(root, &["h1.car-title", "h1.title", "h1"]));
        record.fill(Field::Location, first_text(root, &["div.location", "span.location"]));
        record.fill(Field::ProjectType, first_text(root, &["div.car-model", "span.car-type"]));

        if let Some(contact) = first_element(root, &["div.contact-info"]) {
            record.fill(Field::ContactName, first_text(contact, &["h3", "strong"]));
            record.fill(Field::MobileNumber, tel_link_number(contact));
        }
        // Listings often put the call button outside the contact block
        record.fill(Field::MobileNumber, tel_link_number(root));

        if record.live_count() > 0 {
            record.fill(Field::ProjectType, Some(LISTING_PROJECT_TYPE));
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::extract::Provenance;

    const LISTING_PAGE: &str = r#"
        <html><body>
          <h1 class="car-title">Toyota Hilux 2019</h1>
          <span class="location">Khartoum</span>
          <span class="car-type">Pickup</span>
          <div class="contact-info">
            <h3>Ahmed Ali</h3>
            <a href="tel:+249912345678">+249 912 345 678</a>
          </div>
        </body></html>"#;

    #[test]
    fn test_listing_page_extracts_every_field() {
        let record = ListingStrategy.extract(&Html::parse_document(LISTING_PAGE));
        assert_eq!(record.get(Field::Name), Some("Toyota Hilux 2019"));
        assert_eq!(record.get(Field::Location), Some("Khartoum"));
        assert_eq!(record.get(Field::ProjectType), Some("Pickup"));
        assert_eq!(record.get(Field::ContactName), Some("Ahmed Ali"));
        assert_eq!(record.get(Field::MobileNumber), Some("+249 912 345 678"));
    }

    #[test]
    fn test_implied_type_needs_other_evidence() {
        let empty = ListingStrategy.extract(&Html::parse_document("<html><body></body></html>"));
        assert_eq!(empty.provenance(Field::ProjectType), Provenance::Absent);

        let titled = ListingStrategy.extract(&Html::parse_document("<h1>Nissan Patrol</h1>"));
        assert_eq!(titled.get(Field::ProjectType), Some(LISTING_PROJECT_TYPE));
    }
}
