//! End-to-end interpretation against the bundled knowledge base.

use std::path::PathBuf;

use clarity_extract::{interpret, InterpretationPipeline, KnowledgeBase, KnowledgeBaseBuilder, Status};
use pretty_assertions::assert_eq;

const REPORT: &str = "\
CITY DIAGNOSTICS LAB
Patient: A. Kumar   Age: 45Y   Sex: M
COMPLETE BLOOD COUNT
Haemoglobin          125      g/dL     13.5 - 17.5
Total WBC Count      7,800    cells/cumm   4000 - 11000
Platelet Count       2.1 lakh /cumm
LIPID PROFILE
Total Cholesterol    212 mg/dL
LDL Cholesterol      98 mg/dL
Triglycerides        260 mg/dL
";

fn kb_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/knowledge_base.json")
}

fn pipeline() -> InterpretationPipeline {
    let kb = KnowledgeBase::from_json_str(include_str!("../../../data/knowledge_base.json")).unwrap();
    InterpretationPipeline::new(kb).unwrap()
}

#[test]
fn test_full_report() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let findings = pipeline().interpret(REPORT).unwrap();
    let keys: Vec<&str> = findings.iter().map(|f| f.biomarker_key.as_str()).collect();
    assert_eq!(keys, vec!["hemoglobin", "wbc", "platelets", "total_cholesterol", "ldl", "triglycerides"]);

    let hb = &findings[0];
    assert_eq!(hb.display_name, "Hemoglobin");
    assert_eq!(hb.value, 12.5);
    assert_eq!(hb.status, Status::Low);
    assert_eq!(hb.explanation, "Low hemoglobin may indicate anemia.");

    assert_eq!(findings[1].value, 7800.0);
    assert_eq!(findings[1].status, Status::Normal);

    assert!((findings[2].value - 210_000.0).abs() < 1e-6);
    assert_eq!(findings[2].status, Status::Normal);

    assert_eq!(findings[3].status, Status::Borderline);
    assert_eq!(findings[4].status, Status::Low);
    assert_eq!(findings[4].explanation, "Your LDL is optimal.");
    assert_eq!(findings[5].status, Status::High);

    // one run, one timestamp
    assert!(findings.iter().all(|f| f.timestamp == hb.timestamp));
}

#[test]
fn test_hemoglobin_scenario() {
    let findings = pipeline().interpret("Hemoglobin: 125 g/dL").unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].value, 12.5);
    assert_eq!(findings[0].status, Status::Low);
}

#[test]
fn test_no_known_biomarkers_is_empty_not_error() {
    let findings = pipeline().interpret("Invoice #4411\nConsultation fee: 500\nThank you").unwrap();
    assert!(findings.is_empty());
}

#[test]
fn test_order_follows_knowledge_base_not_text() {
    let findings = pipeline().interpret("Triglycerides 120 mg/dL\nHemoglobin 14.0 g/dL").unwrap();
    let keys: Vec<&str> = findings.iter().map(|f| f.biomarker_key.as_str()).collect();
    assert_eq!(keys, vec!["hemoglobin", "triglycerides"]);
}

#[test]
fn test_random_glucose_and_thyroid() {
    let findings = pipeline().interpret("RBS: 65 mg/dL\nTSH 5.2 mIU/L").unwrap();
    assert_eq!(findings[0].biomarker_key, "glucose");
    assert_eq!(findings[0].status, Status::Low);
    assert_eq!(findings[1].biomarker_key, "tsh");
    assert_eq!(findings[1].status, Status::High);
}

#[test]
fn test_extra_alias_from_builder() {
    let plain = KnowledgeBase::from_path(kb_path()).unwrap();
    assert!(interpret("Cholesterol: 245 mg/dL", &plain).unwrap().is_empty());

    let kb = KnowledgeBaseBuilder::from_path(kb_path())
        .unwrap()
        .extra_alias("total_cholesterol", "cholesterol")
        .build()
        .unwrap();
    let findings = interpret("Cholesterol: 245 mg/dL", &kb).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].biomarker_key, "total_cholesterol");
    assert_eq!(findings[0].status, Status::High);
}

#[test]
fn test_shared_across_threads() {
    let pipeline = pipeline();
    let shared = &pipeline;
    let texts = ["Hb 11.0", "Hb 15.0", "Hb 18.9", "Creatinine 1.6"];
    let expected = [Status::Low, Status::Normal, Status::High, Status::High];

    std::thread::scope(|s| {
        let handles: Vec<_> = texts
            .iter()
            .map(|t| s.spawn(move || shared.interpret(t).unwrap()))
            .collect();
        for (handle, want) in handles.into_iter().zip(expected) {
            assert_eq!(handle.join().unwrap()[0].status, want);
        }
    });
}
