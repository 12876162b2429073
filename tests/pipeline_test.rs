use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use uuid::Uuid;

use project_harvest::app::ports::{ArtifactStorePort, FetcherPort, NotifierPort};
use project_harvest::constants::UNKNOWN;
use project_harvest::domain::{FallbackMetadata, RawContent, SourceTag, TargetDescriptor};
use project_harvest::error::ScraperError;
use project_harvest::pipeline::report::XlsxArtifactStore;
use project_harvest::pipeline::{Harvester, Pipeline, RunSummary};

const LISTING_PAGE: &str = r#"
<html><body>
  <h1 class="car-title">Toyota Hilux 2019</h1>
  <span class="location">khartoum</span>
  <span class="car-type">Pickup</span>
  <div class="contact-info">
    <h3>ahmed ali</h3>
    <a href="tel:+249912345678">+249 912 345 678</a>
  </div>
</body></html>"#;

/// Serves canned pages; anything else is a fetch failure
struct StubFetcher {
    pages: HashMap<String, String>,
}

impl StubFetcher {
    fn new(pages: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|(url, page)| (url.to_string(), page.to_string()))
                .collect(),
        })
    }
}

#[async_trait]
impl FetcherPort for StubFetcher {
    async fn fetch(&self, url: &str) -> RawContent {
        match self.pages.get(url) {
            Some(page) => RawContent::Page(page.clone()),
            None => RawContent::failed("connection refused"),
        }
    }
}

/// Records every notification; optionally fails them
#[derive(Default)]
struct StubNotifier {
    fail: bool,
    calls: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl NotifierPort for StubNotifier {
    async fn notify(&self, artifact_path: &Path, _summary: &RunSummary) -> project_harvest::error::Result<()> {
        self.calls.lock().unwrap().push(artifact_path.to_path_buf());
        if self.fail {
            return Err(ScraperError::Notify("smtp unavailable".to_string()));
        }
        Ok(())
    }
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap()
}

fn full_fallback(name: &str, url: &str) -> TargetDescriptor {
    TargetDescriptor::new(
        name,
        url,
        FallbackMetadata {
            project_type: Some("web development".to_string()),
            location: Some("riyadh".to_string()),
            contact_name: Some("sara osman".to_string()),
            mobile_number: Some("+966 50 123 4567".to_string()),
        },
    )
}

fn harvester(
    fetcher: Arc<StubFetcher>,
    store: Arc<dyn ArtifactStorePort>,
    notifier: Arc<StubNotifier>,
) -> Harvester {
    Harvester::new(Pipeline::default(), fetcher, store, notifier, 4)
}

#[tokio::test]
async fn test_specialized_strategy_full_extraction_scores_one() -> Result<()> {
    let dir = tempdir()?;
    let store = Arc::new(XlsxArtifactStore::new(dir.path().join("report.xlsx"), "Projects"));
    let url = "https://www.sudancar.com/cars/42";
    let target = TargetDescriptor::new("Sudancar", url, FallbackMetadata::default());

    let outcome = harvester(StubFetcher::new(&[(url, LISTING_PAGE)]), store, Arc::default())
        .run(&[target], false)
        .await?;

    let record = &outcome.report.records[0];
    assert!(record.fields.iter().all(|(_, v)| v.source == SourceTag::Live));
    assert_eq!(record.quality_score.value(), 1.0);
    assert_eq!(record.strategy, "listing");
    assert_eq!(record.fields.name.value, "Toyota Hilux 2019");
    assert_eq!(record.fields.location.value, "Khartoum");
    assert_eq!(record.fields.contact_name.value, "Ahmed Ali");
    assert_eq!(record.fields.mobile_number.value, "+249912345678");
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_with_complete_fallback() -> Result<()> {
    let dir = tempdir()?;
    let store = Arc::new(XlsxArtifactStore::new(dir.path().join("report.xlsx"), "Projects"));
    let target = full_fallback("Layla Studio", "https://layla.vercel.app");

    let outcome = harvester(StubFetcher::new(&[]), store, Arc::default())
        .run(&[target], false)
        .await?;

    assert_eq!(outcome.summary.fetch_failures, 1);
    let record = &outcome.report.records[0];
    assert!(record
        .fields
        .iter()
        .all(|(_, v)| v.source == SourceTag::Fallback && !v.value.is_empty()));
    assert_eq!(record.quality_score.value(), 0.0);
    assert_eq!(record.fields.project_type.value, "Web Development");
    assert_eq!(record.fields.mobile_number.value, "+966501234567");
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_without_fallback_is_unknown() -> Result<()> {
    let dir = tempdir()?;
    let store = Arc::new(XlsxArtifactStore::new(dir.path().join("report.xlsx"), "Projects"));
    let target = TargetDescriptor::new(
        "Bare",
        "https://bare.example",
        FallbackMetadata {
            location: Some("Jeddah".to_string()),
            ..Default::default()
        },
    );

    let outcome = harvester(StubFetcher::new(&[]), store, Arc::default())
        .run(&[target], false)
        .await?;

    let fields = &outcome.report.records[0].fields;
    assert_eq!(fields.name.source, SourceTag::Fallback);
    assert_eq!(fields.location.source, SourceTag::Fallback);
    for value in [&fields.project_type, &fields.contact_name, &fields.mobile_number] {
        assert_eq!(value.source, SourceTag::Unknown);
        assert_eq!(value.value, UNKNOWN);
    }
    Ok(())
}

#[tokio::test]
async fn test_duplicates_keep_the_higher_score() -> Result<()> {
    let dir = tempdir()?;
    let store = Arc::new(XlsxArtifactStore::new(dir.path().join("report.xlsx"), "Projects"));
    let live_url = "https://www.sudancar.com/cars/42";
    let targets = vec![
        // Same name and phone as the listing, but everything from fallback
        TargetDescriptor::new(
            "Toyota Hilux 2019",
            "https://mirror.example/hilux",
            FallbackMetadata {
                mobile_number: Some("00249 912 345 678".to_string()),
                ..Default::default()
            },
        ),
        TargetDescriptor::new("Sudancar", live_url, FallbackMetadata::default()),
    ];

    let outcome = harvester(StubFetcher::new(&[(live_url, LISTING_PAGE)]), store, Arc::default())
        .run(&targets, false)
        .await?;

    assert_eq!(outcome.summary.duplicates_removed, 1);
    assert_eq!(outcome.report.records.len(), 1);
    assert_eq!(outcome.report.records[0].source_url, live_url);
    assert_eq!(outcome.report.records[0].quality_score.value(), 1.0);
    Ok(())
}

#[tokio::test]
async fn test_second_run_appends_after_existing_rows() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.xlsx");
    let store = Arc::new(XlsxArtifactStore::new(&path, "Projects"));

    let first: Vec<TargetDescriptor> = (0..10)
        .map(|i| full_fallback(&format!("Project {i}"), &format!("https://p{i}.example")))
        .collect();
    harvester(StubFetcher::new(&[]), store.clone(), Arc::default())
        .run_with(Uuid::new_v4(), at(1, 9), &first, false)
        .await?;
    let before = store.load()?.expect("artifact written");
    assert_eq!(before.len(), 10);

    let second = vec![
        full_fallback("Alpha", "https://alpha.example"),
        full_fallback("Beta", "https://beta.example"),
        full_fallback("Gamma", "https://gamma.example"),
    ];
    let outcome = harvester(StubFetcher::new(&[]), store.clone(), Arc::default())
        .run_with(Uuid::new_v4(), at(2, 10), &second, false)
        .await?;
    assert_eq!(outcome.summary.artifact_rows, 13);

    let after = store.load()?.expect("artifact written");
    assert_eq!(after.len(), 13);
    assert_eq!(&after.rows[..10], &before.rows[..]);
    assert!(after.rows[10..]
        .iter()
        .all(|r| r.run_timestamp == "2024-03-02 10:00:00"));
    assert_eq!(after.runs_recorded(), 2);
    Ok(())
}

#[tokio::test]
async fn test_oversized_page_text_does_not_abort_the_run() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.xlsx");
    let store = Arc::new(XlsxArtifactStore::new(&path, "Projects"));
    let url = "https://www.sudancar.com/cars/7";
    let page = LISTING_PAGE.replace("Toyota Hilux 2019", &"x".repeat(40_000));
    let targets = vec![
        TargetDescriptor::new("Sudancar", url, FallbackMetadata::default()),
        full_fallback("Layla Studio", "https://layla.vercel.app"),
    ];

    let outcome = harvester(StubFetcher::new(&[(url, page.as_str())]), store.clone(), Arc::default())
        .run(&targets, false)
        .await?;

    assert_eq!(outcome.summary.artifact_rows, 2);
    let saved = store.load()?.expect("artifact written");
    assert_eq!(saved.rows[0].name.len(), 32_767);
    assert_eq!(saved.rows[1].name, "Layla Studio");
    Ok(())
}

#[tokio::test]
async fn test_unreadable_artifact_aborts_without_overwriting() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.xlsx");
    std::fs::write(&path, b"corrupted")?;
    let store = Arc::new(XlsxArtifactStore::new(&path, "Projects"));
    let notifier = Arc::new(StubNotifier::default());

    let result = harvester(StubFetcher::new(&[]), store, notifier.clone())
        .run(&[full_fallback("A", "https://a.example")], false)
        .await;

    assert!(matches!(result, Err(ScraperError::Persistence { .. })));
    assert_eq!(std::fs::read(&path)?, b"corrupted");
    assert!(notifier.calls.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_notifier_failure_does_not_fail_the_run() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.xlsx");
    let store = Arc::new(XlsxArtifactStore::new(&path, "Projects"));
    let notifier = Arc::new(StubNotifier {
        fail: true,
        ..Default::default()
    });

    let outcome = harvester(StubFetcher::new(&[]), store, notifier.clone())
        .run(&[full_fallback("A", "https://a.example")], false)
        .await?;

    assert_eq!(outcome.summary.artifact_path.as_deref(), Some(path.as_path()));
    assert_eq!(*notifier.calls.lock().unwrap(), vec![path.clone()]);
    assert!(path.exists());
    Ok(())
}

#[tokio::test]
async fn test_dry_run_writes_nothing() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("report.xlsx");
    let store = Arc::new(XlsxArtifactStore::new(&path, "Projects"));
    let notifier = Arc::new(StubNotifier::default());

    let outcome = harvester(StubFetcher::new(&[]), store, notifier.clone())
        .run(&[full_fallback("A", "https://a.example")], true)
        .await?;

    assert!(outcome.summary.dry_run);
    assert_eq!(outcome.report.records.len(), 1);
    assert!(!path.exists());
    assert!(notifier.calls.lock().unwrap().is_empty());
    Ok(())
}
