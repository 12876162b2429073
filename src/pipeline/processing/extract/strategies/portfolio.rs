use scraper::Html;

use super::html::{find_phone, first_element, first_text, tel_link_number};
use crate::constants::{PORTFOLIO_FAMILY, PORTFOLIO_PROJECT_TYPE};
use crate::domain::Field;
use crate::pipeline::processing::extract::{ExtractedRecord, SiteStrategy};

/// Personal portfolio sites (vercel.app deployments)
pub struct PortfolioStrategy;

impl SiteStrategy for PortfolioStrategy {
    fn family(&self) -> &'static str {
        PORTFOLIO_FAMILY
    }

    fn extract(&self, page: &Html) -> ExtractedRecord {
        let root = page.root_element();
        let mut record = ExtractedRecord::new(self.family());

        record.fill(Field::Name, first_text(root, &["h1", "title"]));
        record.fill(Field::Location, first_text(root, &["div.location", "span.location"]));

        if let Some(contact) = first_element(root, &["#contact", ".contact"]) {
            record.fill(Field::ContactName, first_text(contact, &["h2", "h3"]));
            let phone = tel_link_number(contact).or_else(|| find_phone(contact, "p, span, a"));
            record.fill(Field::MobileNumber, phone);
        }

        if record.live_count() > 0 {
            record.fill(Field::ProjectType, Some(PORTFOLIO_PROJECT_TYPE));
        }

        record
    }
}
