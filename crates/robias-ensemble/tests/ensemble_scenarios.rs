//! End-to-end ensemble scenarios with scripted oracles.
//!
//! # Scenarios covered
//!
//! 1. **Linear-only domain**: rationale order is the reversed linear
//!    ranking and the probability is the linear document probability.
//! 2. **Neural + linear domain**: rankings are Borda-fused and the two
//!    document probabilities averaged.
//! 3. **Missing text**: the whole document fails with the sentinel error.
//! 4. **Oracle failure**: any failing domain fails the whole document.
//! 5. **Canonical order**: output follows the configured domain order.
//! 6. **Feature accumulation order**: the linear oracle sees full text,
//!    domain-tagged text, then interaction-tagged rationale text.

use anyhow::{Result, bail};
use robias_core::{Document, Domain, EnsembleConfig, ErrorCode, RiskLabel};
use robias_ensemble::oracle::FeatureView;
use robias_ensemble::rationale::SentenceOutOfRange;
use robias_ensemble::{
    BiasEnsemble, EngineError, EnsembleSettings, FeatureContext, OracleRegistry, OracleRole, ScoringOracle,
    SentenceRanking, linear_document_probability,
};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Scripted oracles
// ---------------------------------------------------------------------------

/// Recorded document-probability call: `(tag, texts)` per view.
type RecordedViews = Vec<(Option<String>, Vec<String>)>;

struct ScriptedLinear {
    order: Vec<usize>,
    probability: f64,
    fail_on: Option<Domain>,
    calls: Mutex<Vec<RecordedViews>>,
}

impl ScriptedLinear {
    fn new(order: Vec<usize>, probability: f64) -> Self {
        Self {
            order,
            probability,
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScoringOracle for ScriptedLinear {
    fn role(&self) -> OracleRole {
        OracleRole::Linear
    }

    fn rank_sentences(&self, _document: &Document, domain: Domain) -> Result<SentenceRanking> {
        if self.fail_on == Some(domain) {
            bail!("sentence model exploded");
        }
        Ok(SentenceRanking::order_only(self.order.clone()))
    }

    fn document_probability(&self, features: &FeatureContext<'_>) -> Result<f64> {
        let views = features
            .views()
            .iter()
            .map(|view| {
                let texts = match view {
                    FeatureView::Plain(texts) | FeatureView::Tagged { texts, .. } => {
                        texts.iter().map(|t| (*t).to_string()).collect()
                    }
                };
                (view.tag().map(str::to_string), texts)
            })
            .collect();
        self.calls.lock().expect("lock").push(views);
        Ok(self.probability)
    }
}

/// Linear oracle whose probability depends on the rationale text, so
/// bit-for-bit comparisons are meaningful.
struct TextSensitiveLinear;

impl ScoringOracle for TextSensitiveLinear {
    fn role(&self) -> OracleRole {
        OracleRole::Linear
    }

    fn rank_sentences(&self, document: &Document, _domain: Domain) -> Result<SentenceRanking> {
        Ok(SentenceRanking::order_only((0..document.sentences().len()).collect()))
    }

    #[allow(clippy::cast_precision_loss)]
    fn document_probability(&self, features: &FeatureContext<'_>) -> Result<f64> {
        let chars: usize = features
            .views()
            .iter()
            .map(|view| match view {
                FeatureView::Plain(texts) | FeatureView::Tagged { texts, .. } => {
                    texts.iter().map(|t| t.len()).sum::<usize>()
                }
            })
            .sum();
        Ok(1.0 / (1.0 + (chars as f64).sqrt()))
    }
}

struct ScriptedNeural {
    order: Vec<usize>,
    probability: Option<f64>,
}

impl ScoringOracle for ScriptedNeural {
    fn role(&self) -> OracleRole {
        OracleRole::Neural
    }

    fn rank_sentences(&self, _document: &Document, _domain: Domain) -> Result<SentenceRanking> {
        Ok(SentenceRanking {
            order: self.order.clone(),
            document_probability: self.probability,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TEXT: &str = "Participants were randomised by computer. \
                    Allocation was concealed in envelopes. \
                    Assessors were blinded.";

fn three_sentences() -> Document {
    Document::from_spans(TEXT, &[(0, 41), (42, 80), (81, 104)]).expect("valid spans")
}

fn linear_only(linear: ScriptedLinear) -> (Arc<ScriptedLinear>, BiasEnsemble) {
    let linear = Arc::new(linear);
    let registry = OracleRegistry::new(linear.clone()).expect("linear registry");
    (linear, BiasEnsemble::new(registry, EnsembleSettings::default()))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn linear_only_domain_reverses_ranking() {
    let (_, ensemble) = linear_only(ScriptedLinear::new(vec![2, 0, 1], 0.7));
    let doc = three_sentences();

    let scores = ensemble.annotate(&doc, "trial.xml").expect("annotate");
    let rsg = scores.get(Domain::RandomSequenceGeneration).expect("RSG result");

    let rationale = rsg.rationale.as_ref().expect("rationales emitted");
    let starts: Vec<_> = rationale.iter().map(|r| r.start).collect();
    assert_eq!(starts, vec![42, 0, 81], "order [1, 0, 2]");
    assert!((rsg.probability - 0.7).abs() < f64::EPSILON);
    assert_eq!(rsg.label, RiskLabel::Low);
    assert_eq!(rsg.filename, "trial.xml");
}

#[test]
fn threshold_boundary_classifies_low() {
    let (_, ensemble) = linear_only(ScriptedLinear::new(vec![0, 1, 2], 0.5));
    let scores = ensemble.annotate(&three_sentences(), "t.xml").expect("annotate");
    assert!(scores.results.iter().all(|r| r.label == RiskLabel::Low));
}

#[test]
fn linear_only_probability_matches_direct_linear_path() {
    let linear: Arc<dyn ScoringOracle> = Arc::new(TextSensitiveLinear);
    let registry = OracleRegistry::new(linear.clone()).expect("registry");
    let ensemble = BiasEnsemble::new(registry, EnsembleSettings::default());
    let doc = three_sentences();

    let scores = ensemble.annotate(&doc, "t.xml").expect("annotate");
    for result in &scores.results {
        let expected = linear_document_probability(linear.as_ref(), &doc, result.domain, &[2, 1, 0])
            .expect("direct probability");
        assert_eq!(result.probability.to_bits(), expected.to_bits());
    }
}

#[test]
fn neural_domain_fuses_rankings_and_averages_probabilities() {
    let linear = Arc::new(ScriptedLinear::new(vec![2, 0, 1], 0.6));
    let neural = Arc::new(ScriptedNeural {
        order: vec![1, 2, 0],
        probability: Some(0.2),
    });
    let registry = OracleRegistry::new(linear)
        .and_then(|r| r.with_neural(Domain::AllocationConcealment, neural))
        .expect("registry");
    let ensemble = BiasEnsemble::new(registry, EnsembleSettings::default());

    let scores = ensemble.annotate(&three_sentences(), "t.xml").expect("annotate");

    // neural a = [1, 2, 0], linear b = [2, 0, 1]
    // 1: 1 + 3 = 4 ; 2: 1 + 2 = 3 ; 0: 3 + 2 = 5
    let ac = scores.get(Domain::AllocationConcealment).expect("AC");
    let starts: Vec<_> = ac
        .rationale
        .as_ref()
        .expect("rationales")
        .iter()
        .map(|r| r.start)
        .collect();
    assert_eq!(starts, vec![0, 42, 81]);
    assert!((ac.probability - 0.4).abs() < 1e-12);
    assert_eq!(ac.label, RiskLabel::HighUnclear);

    let rsg = scores.get(Domain::RandomSequenceGeneration).expect("RSG");
    assert!((rsg.probability - 0.6).abs() < f64::EPSILON);
}

#[test]
fn neural_without_joint_probability_falls_back_to_linear() {
    let linear = Arc::new(ScriptedLinear::new(vec![0, 1, 2], 0.35));
    let neural = Arc::new(ScriptedNeural {
        order: vec![0, 1, 2],
        probability: None,
    });
    let registry = OracleRegistry::new(linear)
        .and_then(|r| r.with_neural(Domain::BlindingOutcomeAssessment, neural))
        .expect("registry");
    let ensemble = BiasEnsemble::new(registry, EnsembleSettings::default());

    let result = ensemble
        .score_domain(&three_sentences(), "t.xml", Domain::BlindingOutcomeAssessment)
        .expect("score");
    assert!((result.probability - 0.35).abs() < f64::EPSILON);
}

#[test]
fn missing_text_fails_whole_document() {
    let (linear, ensemble) = linear_only(ScriptedLinear::new(vec![], 0.9));

    let err = ensemble
        .annotate(&Document::unsegmented("   \n"), "empty.xml")
        .expect_err("no text");
    assert!(err.is_missing_text());
    assert_eq!(err.code(), ErrorCode::MissingText);
    assert!(linear.calls.lock().expect("lock").is_empty(), "no oracle was consulted");
}

#[test]
fn text_without_sentences_is_a_valid_empty_result() {
    let (_, ensemble) = linear_only(ScriptedLinear::new(vec![], 0.8));

    let scores = ensemble
        .annotate(&Document::unsegmented("Unsegmented body text"), "flat.xml")
        .expect("valid empty result");
    assert_eq!(scores.results.len(), 4);
    assert!(
        scores
            .results
            .iter()
            .all(|r| r.rationale.as_ref().is_some_and(Vec::is_empty))
    );
}

#[test]
fn oracle_failure_fails_whole_document() {
    let mut linear = ScriptedLinear::new(vec![0, 1, 2], 0.9);
    linear.fail_on = Some(Domain::BlindingParticipantsPersonnel);
    let (_, ensemble) = linear_only(linear);

    let err = ensemble.annotate(&three_sentences(), "t.xml").expect_err("oracle failure");
    match &err {
        EngineError::Oracle { domain, role, .. } => {
            assert_eq!(*domain, Domain::BlindingParticipantsPersonnel);
            assert_eq!(*role, OracleRole::Linear);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.code(), ErrorCode::OracleFailure);
}

#[test]
fn out_of_range_ranking_is_rejected() {
    let (_, ensemble) = linear_only(ScriptedLinear::new(vec![0, 7], 0.9));
    let err = ensemble.annotate(&three_sentences(), "t.xml").expect_err("bad index");
    assert!(matches!(
        err,
        EngineError::InvalidRanking {
            index: 7,
            sentences: 3,
            ..
        }
    ));
}

#[test]
fn direct_linear_path_rejects_out_of_range_rationale_order() {
    let linear = ScriptedLinear::new(vec![0, 1], 0.3);
    let doc = Document::from_spans("First one. Second one.", &[(0, 10), (11, 22)]).expect("valid spans");

    let err = linear_document_probability(&linear, &doc, Domain::AllocationConcealment, &[5])
        .expect_err("index past last sentence");
    let out_of_range = err
        .downcast_ref::<SentenceOutOfRange>()
        .expect("typed rationale error");
    assert_eq!(
        *out_of_range,
        SentenceOutOfRange {
            index: 5,
            sentences: 2
        }
    );
    assert!(linear.calls.lock().expect("lock").is_empty(), "oracle never called");
}

#[test]
fn out_of_range_probability_is_rejected() {
    let (_, ensemble) = linear_only(ScriptedLinear::new(vec![0], 1.2));
    let err = ensemble.annotate(&three_sentences(), "t.xml").expect_err("bad probability");
    assert_eq!(err.code(), ErrorCode::InvalidProbability);
}

#[test]
fn output_follows_configured_domain_order() {
    let linear = Arc::new(ScriptedLinear::new(vec![0, 1, 2], 0.9));
    let registry = OracleRegistry::new(linear).expect("registry");
    let config = EnsembleConfig {
        domains: vec![
            Domain::BlindingOutcomeAssessment,
            Domain::RandomSequenceGeneration,
            Domain::AllocationConcealment,
        ],
        neural_domains: Vec::new(),
        ..EnsembleConfig::default()
    };
    let ensemble = BiasEnsemble::from_config(registry, &config).expect("valid config");

    let scores = ensemble.annotate(&three_sentences(), "t.xml").expect("annotate");
    assert_eq!(scores.domains(), config.domains);

    let default_order = linear_only(ScriptedLinear::new(vec![0, 1, 2], 0.9))
        .1
        .annotate(&three_sentences(), "t.xml")
        .expect("annotate");
    assert_eq!(default_order.domains(), Domain::ALL.to_vec());
}

#[test]
fn top_k_bounds_rationales_and_interaction_text() {
    let linear = Arc::new(ScriptedLinear::new(vec![2, 0, 1], 0.9));
    let registry = OracleRegistry::new(linear.clone()).expect("registry");
    let settings = EnsembleSettings {
        top_k: Some(2),
        domains: vec![Domain::RandomSequenceGeneration],
        ..EnsembleSettings::default()
    };
    let ensemble = BiasEnsemble::new(registry, settings);
    let doc = three_sentences();

    let scores = ensemble.annotate(&doc, "t.xml").expect("annotate");
    let rationale = scores.results[0].rationale.as_ref().expect("rationales");
    assert_eq!(rationale.len(), 2);

    let calls = linear.calls.lock().expect("lock");
    let interaction = &calls[0][2].1[0];
    assert_eq!(
        interaction,
        &format!("{} {}", doc.sentences()[1].text, doc.sentences()[0].text)
    );
}

#[test]
fn document_probability_views_keep_accumulation_order() {
    let (linear, ensemble) = linear_only(ScriptedLinear::new(vec![2, 0, 1], 0.7));
    let doc = three_sentences();

    ensemble
        .score_domain(&doc, "t.xml", Domain::AllocationConcealment)
        .expect("score");

    let calls = linear.calls.lock().expect("lock");
    assert_eq!(calls.len(), 1, "one fresh context per scoring call");
    let views = &calls[0];
    assert_eq!(views.len(), 3);
    assert_eq!(views[0], (None, vec![TEXT.to_string()]));
    assert_eq!(
        views[1],
        (Some("Allocation concealment".to_string()), vec![TEXT.to_string()])
    );
    let joined = format!(
        "{} {} {}",
        doc.sentences()[1].text,
        doc.sentences()[0].text,
        doc.sentences()[2].text
    );
    assert_eq!(
        views[2],
        (Some("-s-Allocation concealment".to_string()), vec![joined])
    );
}

#[test]
fn rationales_can_be_suppressed() {
    let linear = Arc::new(ScriptedLinear::new(vec![2, 0, 1], 0.7));
    let registry = OracleRegistry::new(linear).expect("registry");
    let settings = EnsembleSettings {
        emit_rationales: false,
        ..EnsembleSettings::default()
    };
    let scores = BiasEnsemble::new(registry, settings)
        .annotate(&three_sentences(), "t.xml")
        .expect("annotate");
    assert!(scores.results.iter().all(|r| r.rationale.is_none()));
}

#[test]
fn shared_ensemble_scores_documents_concurrently() {
    let linear: Arc<dyn ScoringOracle> = Arc::new(TextSensitiveLinear);
    let registry = OracleRegistry::new(linear).expect("registry");
    let ensemble = BiasEnsemble::new(registry, EnsembleSettings::default());
    let doc = three_sentences();

    let sequential = ensemble.annotate(&doc, "t.xml").expect("annotate");
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| ensemble.annotate(&doc, "t.xml").expect("annotate")))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread"), sequential);
        }
    });
}
