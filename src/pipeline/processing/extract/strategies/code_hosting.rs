use scraper::Html;

use super::html::first_text;
use crate::constants::{CODE_HOSTING_FAMILY, CODE_HOSTING_PROJECT_TYPE};
use crate::domain::Field;
use crate::pipeline::processing::extract::{ExtractedRecord, SiteStrategy};

/// Code-hosting profile and repository pages (github.com).
/// These pages never publish phone numbers, so mobile stays absent.
pub struct CodeHostingStrategy;

impl SiteStrategy for CodeHostingStrategy {
    fn family(&self) -> &'static str {
        CODE_HOSTING_FAMILY
    }

    fn extract(&self, page: &Html) -> ExtractedRecord {
        let root = page.root_element();
        let mut record = ExtractedRecord::new(self.family());

        // Repository title first, then profile handle
        record.fill(
            Field::Name,
            first_text(
                root,
                &[r#"strong[itemprop="name"] a"#, "span.p-nickname", "h1.d-inline", "h1"],
            ),
        );
        record.fill(
            Field::Location,
            first_text(
                root,
                &[
                    r#".js-profile-editable-area [itemprop="homeLocation"]"#,
                    r#"[itemprop="homeLocation"]"#,
                    ".vcard-details .p-label",
                ],
            ),
        );
        record.fill(
            Field::ContactName,
            first_text(
                root,
                &[
                    r#".js-profile-editable-area [itemprop="name"]"#,
                    "span.p-name",
                    r#"a[rel="author"]"#,
                    "a.url.fn",
                ],
            ),
        );

        if record.live_count() > 0 {
            record.fill(Field::ProjectType, Some(CODE_HOSTING_PROJECT_TYPE));
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::extract::Provenance;

    #[test]
    fn test_profile_page() {
        let page = Html::parse_document(
            r#"<html><body>
                <div class="js-profile-editable-area">
                  <h1 class="vcard-names">
                    <span class="p-name" itemprop="name">Sara Osman</span>
                    <span class="p-nickname">sosman</span>
                  </h1>
                  <ul class="vcard-details">
                    <li itemprop="homeLocation"><span class="p-label">Riyadh, Saudi Arabia</span></li>
                  </ul>
                </div>
            </body></html>"#,
        );
        let record = CodeHostingStrategy.extract(&page);
        assert_eq!(record.get(Field::Name), Some("sosman"));
        assert_eq!(record.get(Field::ContactName), Some("Sara Osman"));
        assert_eq!(record.get(Field::Location), Some("Riyadh, Saudi Arabia"));
        assert_eq!(record.get(Field::ProjectType), Some(CODE_HOSTING_PROJECT_TYPE));
        assert_eq!(record.provenance(Field::MobileNumber), Provenance::Absent);
    }

    #[test]
    fn test_repository_page_uses_author_link() {
        let page = Html::parse_document(
            r#"<html><body>
                <a rel="author" href="/acme">acme-labs</a>
                <strong itemprop="name"><a href="/acme/rocket">rocket</a></strong>
            </body></html>"#,
        );
        let record = CodeHostingStrategy.extract(&page);
        assert_eq!(record.get(Field::Name), Some("rocket"));
        assert_eq!(record.get(Field::ContactName), Some("acme-labs"));
        assert_eq!(record.provenance(Field::Location), Provenance::Absent);
    }
}
