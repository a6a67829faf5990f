use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use greenscore_classify::{ClassificationError, ClassificationResult, Classifier, ServiceErrorKind};
use greenscore_core::{Category, MemoryStore};
use greenscore_engine::{Engine, EngineConfig, EngineError};
use tokio::sync::Notify;

enum Script {
    Rank(Vec<(&'static str, f64)>),
    Fail(ServiceErrorKind),
    Hang,
    /// Rank as transport once `release` is notified
    Gated,
}

struct Scripted {
    script: Script,
    calls: AtomicUsize,
    release: Notify,
}

impl Scripted {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            release: Notify::new(),
        }
    }

    fn top(label: &'static str, score: f64) -> Self {
        let rest = (1.0 - score) / 3.0;
        let mut pairs = vec![(label, score)];
        for other in ["water", "energy", "transport", "waste"] {
            if other != label {
                pairs.push((other, rest));
            }
        }
        Self::new(Script::Rank(pairs))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn ranked(pairs: &[(&str, f64)]) -> Result<ClassificationResult, ClassificationError> {
    let labels: Vec<String> = pairs.iter().map(|(l, _)| l.to_string()).collect();
    let scores: Vec<f64> = pairs.iter().map(|(_, s)| *s).collect();
    ClassificationResult::from_labels_scores(&labels, &scores)
}

impl Classifier for Scripted {
    async fn rank(
        &self,
        _text: &str,
        _labels: &[&str],
    ) -> Result<ClassificationResult, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Rank(pairs) => ranked(pairs),
            Script::Fail(kind) => Err(ClassificationError::service(*kind, "scripted failure")),
            Script::Hang => std::future::pending().await,
            Script::Gated => {
                self.release.notified().await;
                ranked(&[("transport", 0.9), ("energy", 0.1)])
            }
        }
    }
}

fn engine(classifier: Scripted) -> Engine<Scripted, MemoryStore> {
    Engine::open(classifier, MemoryStore::new(), EngineConfig::default()).unwrap()
}

#[tokio::test]
async fn test_confident_submission_is_recorded() {
    let e = engine(Scripted::top("transport", 0.93));

    let r = e.classify_and_record("drove 10km by car").await.unwrap();
    assert_eq!(r.category, Category::Transport);
    assert_eq!(r.confidence, Some(0.93));
    assert_eq!(
        r.summary,
        "Category: Transport\nAdding: 1.20 kg CO₂\nImpact: 17.1%"
    );

    let p = e.progress().await;
    assert!((p.totals.transport - 1.2).abs() < 1e-9);
    assert!((p.totals.total - 1.8).abs() < 1e-9);

    let h = e.history(10).await;
    assert_eq!(h.len(), 1);
    assert_eq!(h[0].input, "drove 10km by car");
    assert_eq!(h[0].summary, r.summary);
}

#[tokio::test]
async fn test_low_confidence_does_not_merge() {
    let e = engine(Scripted::top("water", 0.4));

    let err = e.classify_and_record("did a thing").await.unwrap_err();
    match err {
        EngineError::LowConfidence { best, score } => {
            assert_eq!(best, Category::Water);
            assert_eq!(score, 0.4);
        }
        other => panic!("expected LowConfidence, got {other:?}"),
    }

    let p = e.progress().await;
    assert_eq!(p.totals.water, 0.0);
    assert!(e.history(10).await.is_empty());

    assert_eq!(
        e.submit("did a thing").await,
        "⚠️ Action not recognized (best guess: Water, 40% confidence)"
    );
}

#[tokio::test]
async fn test_low_confidence_caller_opt_in() {
    let e = engine(Scripted::top("water", 0.4));
    assert!(e.classify_and_record("took a long hot shower").await.is_err());

    // Caller accepts the best guess explicitly
    let r = e.record("took a long hot shower", Category::Water).await.unwrap();
    assert_eq!(r.confidence, None);
    assert_eq!(r.estimate.unwrap().raw_value, 50.0);
    assert_eq!(e.progress().await.totals.water, 50.0);
}

#[tokio::test]
async fn test_proceed_on_low_confidence_config() {
    let cfg = EngineConfig {
        proceed_on_low_confidence: true,
        ..EngineConfig::default()
    };
    let e = Engine::open(Scripted::top("water", 0.4), MemoryStore::new(), cfg).unwrap();

    let r = e.classify_and_record("took a long hot shower").await.unwrap();
    assert_eq!(r.confidence, Some(0.4));
    assert_eq!(e.progress().await.totals.water, 50.0);
}

#[tokio::test]
async fn test_empty_input_never_reaches_classifier() {
    let e = engine(Scripted::top("water", 0.9));

    assert!(matches!(e.classify_and_record("").await, Err(EngineError::EmptyInput)));
    assert!(matches!(e.classify_and_record("   ").await, Err(EngineError::EmptyInput)));
    assert!(matches!(e.record("", Category::Water).await, Err(EngineError::EmptyInput)));
    assert_eq!(e.classifier().calls(), 0);
    assert_eq!(e.submit("").await, "⚠️ Empty input");
}

#[tokio::test]
async fn test_service_error_is_surfaced_not_recorded() {
    let e = engine(Scripted::new(Script::Fail(ServiceErrorKind::BadShape)));

    let err = e.classify_and_record("took a shower").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Service {
            kind: ServiceErrorKind::BadShape,
            ..
        }
    ));
    assert_eq!(
        e.submit("took a shower").await,
        "Classification failed (bad response shape)"
    );
    assert!(e.history(10).await.is_empty());
}

#[tokio::test]
async fn test_timeout_discards_pending_result() {
    let cfg = EngineConfig {
        timeout: Duration::from_millis(20),
        ..EngineConfig::default()
    };
    let e = Engine::open(Scripted::new(Script::Hang), MemoryStore::new(), cfg).unwrap();

    let err = e.classify_and_record("drove 10km by car").await.unwrap_err();
    assert!(matches!(err, EngineError::Timeout(_)));
    assert_eq!(e.progress().await.totals.transport, 0.0);

    // The in-flight slot was released
    assert!(e.record("drove 10km by car", Category::Transport).await.is_ok());
}

#[tokio::test]
async fn test_caller_cancellation_leaves_no_trace() {
    let e = engine(Scripted::new(Script::Hang));

    let res = tokio::time::timeout(
        Duration::from_millis(20),
        e.classify_and_record("drove 10km by car"),
    )
    .await;
    assert!(res.is_err());

    assert_eq!(e.progress().await.totals.transport, 0.0);
    assert!(e.history(10).await.is_empty());
    assert!(e.record("walked 5km", Category::Transport).await.is_ok());
}

#[tokio::test]
async fn test_overlapping_submission_is_rejected() {
    let e = engine(Scripted::new(Script::Gated));

    let (first, second) = tokio::join!(e.classify_and_record("drove 10km by car"), async {
        tokio::task::yield_now().await;
        let r = e.classify_and_record("drove 10km by car").await;
        e.classifier().release.notify_one();
        r
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(EngineError::Busy)));
    assert_eq!(e.classifier().calls(), 1);

    // Accumulated exactly once
    assert!((e.progress().await.totals.transport - 1.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_blank_input_during_flight_is_empty_not_busy() {
    let e = engine(Scripted::new(Script::Gated));

    let (first, second) = tokio::join!(e.classify_and_record("drove 10km by car"), async {
        tokio::task::yield_now().await;
        let r = e.classify_and_record("   ").await;
        e.classifier().release.notify_one();
        r
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(EngineError::EmptyInput)));
    assert_eq!(e.classifier().calls(), 1);
}

#[tokio::test]
async fn test_oversized_quantity_keeps_store_reloadable() {
    let e = engine(Scripted::top("transport", 0.9));
    let huge = "9".repeat(400);

    // Unreadable distances fall back to a typical trip for the mode
    let walked = e.classify_and_record(&format!("walked {huge} km")).await.unwrap();
    assert_eq!(walked.estimate.unwrap().raw_value, 0.0);
    let drove = e.classify_and_record(&format!("drove {huge} km")).await.unwrap();
    assert!((drove.estimate.unwrap().raw_value - 1.2).abs() < 1e-9);

    let before = e.progress().await;
    assert!(before.totals.transport.is_finite());

    let json = serde_json::to_string(&e.into_store()).unwrap();
    let store: MemoryStore = serde_json::from_str(&json).unwrap();
    let reopened =
        Engine::open(Scripted::top("water", 0.9), store, EngineConfig::default()).unwrap();
    let after = reopened.progress().await;
    assert!((after.totals.transport - before.totals.transport).abs() < 1e-9);
    assert!((after.totals.total - before.totals.total).abs() < 1e-9);
    assert_eq!(reopened.history(10).await.len(), 2);
}

#[tokio::test]
async fn test_waste_without_cue_records_zero() {
    let e = engine(Scripted::top("waste", 0.8));

    let r = e.classify_and_record("cleaned the garage").await.unwrap();
    assert!(r.estimate.is_none());
    assert_eq!(r.summary, "Category: Waste\nImpact: 0.0%");
    assert_eq!(e.progress().await.totals.waste, 0.0);
    assert_eq!(e.history(10).await.len(), 1);
}

#[tokio::test]
async fn test_reset_is_atomic_and_merge_restarts() {
    let e = engine(Scripted::top("energy", 0.9));
    e.classify_and_record("ran the AC for 2 hours").await.unwrap();
    e.classify_and_record("watched TV").await.unwrap();
    e.increment_streak().await.unwrap();

    e.reset().await.unwrap();
    let p = e.progress().await;
    assert_eq!(p.totals.energy, 0.0);
    assert_eq!(p.totals.total, 0.0);
    assert_eq!(p.streak_days, 1);
    assert!(e.history(10).await.is_empty());

    e.classify_and_record("watched TV").await.unwrap();
    assert!((e.progress().await.totals.energy - 0.1).abs() < 1e-9);
}

#[tokio::test]
async fn test_history_capacity_through_engine() {
    let cfg = EngineConfig {
        history_capacity: 3,
        ..EngineConfig::default()
    };
    let e = Engine::open(Scripted::top("water", 0.9), MemoryStore::new(), cfg).unwrap();
    for i in 0..5 {
        e.classify_and_record(&format!("shower number {i}")).await.unwrap();
    }

    let h = e.history(100).await;
    let inputs: Vec<_> = h.iter().map(|x| x.input.as_str()).collect();
    assert_eq!(inputs, vec!["shower number 4", "shower number 3", "shower number 2"]);
    // totals still count every submission
    assert_eq!(e.progress().await.totals.water, 5.0 * 35.0);
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let e = engine(Scripted::top("transport", 0.9));
    e.classify_and_record("drove 10km by car").await.unwrap();
    e.increment_streak().await.unwrap();
    assert_eq!(e.complete_challenge("energy-saving").await.unwrap(), 200);
    let before = e.progress().await;
    let store = e.into_store();

    let reopened =
        Engine::open(Scripted::top("water", 0.9), store, EngineConfig::default()).unwrap();
    assert_eq!(reopened.progress().await, before);
    assert_eq!(reopened.history(10).await.len(), 1);
    assert_eq!(before.points, 200);

    let challenges = reopened.challenges().await;
    let (_, st) = challenges.iter().find(|(c, _)| c.id == "energy-saving").unwrap();
    assert!(st.completed);
}

#[tokio::test]
async fn test_progress_percentages() {
    let e = engine(Scripted::top("transport", 0.9));
    e.classify_and_record("drove 100 km").await.unwrap();

    let p = e.progress().await;
    let transport = p
        .percentages
        .iter()
        .find(|(c, _)| *c == Category::Transport)
        .unwrap()
        .1;
    assert_eq!(transport, 100.0);
    assert!((p.overall - 30.0).abs() < 1e-9);
}
