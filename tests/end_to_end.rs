//! Whole-pipeline tests
//!
//! Queue, classification, builtin plugins, output rendering and the
//! metadata store working together through the public API.

mod common;

use common::{fake_zip_extractor, test_config, write_sample, PDF_SAMPLE, ZIP_SAMPLE};
use filehound::core::config::RUN_CONFIG_FILE;
use filehound::orchestrator::{AnalyzeOptions, Orchestrator};
use filehound::plugin::builtin::{file_info, zip_extract};
use filehound::queue::{Job, WorkQueue};
use filehound::results::Value;

#[tokio::test]
async fn test_pdf_gets_file_information_and_text_output() {
    let base = tempfile::tempdir().unwrap();
    let samples = tempfile::tempdir().unwrap();
    let sample = write_sample(samples.path(), "invoice.pdf", PDF_SAMPLE);

    let orchestrator = Orchestrator::new(test_config(base.path())).unwrap();
    let report = orchestrator
        .analyze_file(&sample, &AnalyzeOptions::default())
        .await
        .unwrap();

    assert_eq!(report.classification.categories, vec!["Generic", "PDF"]);
    assert_eq!(report.out_dir, base.path().join(&report.hashes.sha256));
    assert!(report.failed.is_empty());

    let page = &report.report["Generic"][file_info::NAME];
    let table = page.table("File Information").unwrap();
    let row = &table.rows().next().unwrap().values;
    assert_eq!(row[0], Value::from("invoice.pdf"));
    assert_eq!(row[1], Value::Integer(PDF_SAMPLE.len() as i64));

    let text = std::fs::read_to_string(report.out_dir.join("output.txt")).unwrap();
    assert!(text.contains("File Information (Generic)"));
    assert!(text.contains(&report.hashes.sha256));
    assert!(report.out_dir.join(RUN_CONFIG_FILE).is_file());
}

fn times_seen(report: &filehound::orchestrator::AnalysisReport) -> Value {
    let table = report.report["Generic"][file_info::NAME]
        .table("File Information")
        .unwrap();
    let header = table.header().unwrap();
    let column = header.iter().position(|c| c.name == "Times Seen").unwrap();
    table.rows().next().unwrap().values[column].clone()
}

#[tokio::test]
async fn test_same_path_twice_is_counted() {
    let base = tempfile::tempdir().unwrap();
    let samples = tempfile::tempdir().unwrap();
    let sample = write_sample(samples.path(), "a.pdf", PDF_SAMPLE);

    let orchestrator = Orchestrator::new(test_config(base.path())).unwrap();
    let options = AnalyzeOptions::default();
    let one = orchestrator.analyze_file(&sample, &options).await.unwrap();
    let two = orchestrator.analyze_file(&sample, &options).await.unwrap();

    assert_eq!(times_seen(&one), Value::Integer(1));
    assert_eq!(times_seen(&two), Value::Integer(2));
}

#[tokio::test]
async fn test_renamed_copy_shares_sample_but_not_sighting() {
    let base = tempfile::tempdir().unwrap();
    let samples = tempfile::tempdir().unwrap();
    let first = write_sample(samples.path(), "a.pdf", PDF_SAMPLE);
    let copy = write_sample(samples.path(), "copy-of-a.pdf", PDF_SAMPLE);

    let orchestrator = Orchestrator::new(test_config(base.path())).unwrap();
    let options = AnalyzeOptions::default();
    let one = orchestrator.analyze_file(&first, &options).await.unwrap();
    let two = orchestrator.analyze_file(&copy, &options).await.unwrap();

    assert_eq!(one.sample_id, two.sample_id);
    assert_eq!(times_seen(&two), Value::Integer(1));
}

#[tokio::test]
async fn test_json_output_when_configured() {
    let base = tempfile::tempdir().unwrap();
    let samples = tempfile::tempdir().unwrap();
    let sample = write_sample(samples.path(), "doc.pdf", PDF_SAMPLE);
    let mut config = test_config(base.path());
    config.set_var("Output", "formats", "json,text");

    let orchestrator = Orchestrator::new(config).unwrap();
    let report = orchestrator
        .analyze_file(&sample, &AnalyzeOptions::default())
        .await
        .unwrap();

    let json = std::fs::read_to_string(report.out_dir.join("output.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed["Generic"][file_info::NAME].is_object());
    assert_eq!(report.outputs.len(), 2);
}

#[tokio::test]
async fn test_drain_analyses_queued_directory() {
    let base = tempfile::tempdir().unwrap();
    let samples = tempfile::tempdir().unwrap();
    write_sample(samples.path(), "one.pdf", PDF_SAMPLE);
    write_sample(samples.path(), "nested/two.txt", b"plain text");

    let mut orchestrator = Orchestrator::new(test_config(base.path())).unwrap();
    assert_eq!(orchestrator.enqueue_path(samples.path()).unwrap(), 2);

    let summary = orchestrator
        .drain_queue(&AnalyzeOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.analyzed, 2);
    assert_eq!(summary.failed, 0);
    assert!(orchestrator.queue().is_empty().unwrap());
}

#[tokio::test]
async fn test_extracted_members_are_fed_back_and_analysed() {
    let base = tempfile::tempdir().unwrap();
    let samples = tempfile::tempdir().unwrap();
    let archive = write_sample(samples.path(), "bundle.zip", ZIP_SAMPLE);
    let mut config = test_config(base.path());
    fake_zip_extractor(&mut config);
    config.set_var(zip_extract::NAME, "feedback", "yes");

    let mut orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.enqueue_path(&archive).unwrap();
    let summary = orchestrator
        .drain_queue(&AnalyzeOptions::default())
        .await
        .unwrap();

    // the archive plus both members
    assert_eq!(summary.analyzed, 3);
    assert!(orchestrator.queue().is_empty().unwrap());
}

#[tokio::test]
async fn test_forced_category_and_single_plugin() {
    let base = tempfile::tempdir().unwrap();
    let samples = tempfile::tempdir().unwrap();
    let sample = write_sample(samples.path(), "plain.bin", b"nothing special");
    let mut config = test_config(base.path());
    fake_zip_extractor(&mut config);

    let orchestrator = Orchestrator::new(config).unwrap();
    let options = AnalyzeOptions {
        forced_category: Some("ZIP".to_string()),
        single_plugin: Some(zip_extract::NAME.to_string()),
    };
    let report = orchestrator.analyze_file(&sample, &options).await.unwrap();

    assert!(report.classification.contains("ZIP"));
    assert_eq!(report.report.len(), 1);
    assert!(report.report["ZIP"].contains_key(zip_extract::NAME));
}

#[test]
fn test_queue_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("filehound.db");
    {
        let queue: WorkQueue<Job> = WorkQueue::open(&db).unwrap();
        queue.append(&Job::analyze("/samples/a")).unwrap();
        queue.append(&Job::analyze("/samples/b")).unwrap();
    }

    let mut queue: WorkQueue<Job> = WorkQueue::open(&db).unwrap();
    assert_eq!(queue.len().unwrap(), 2);
    assert_eq!(queue.try_pop().unwrap(), Some(Job::analyze("/samples/a")));
    assert_eq!(queue.try_pop().unwrap(), Some(Job::analyze("/samples/b")));
}
