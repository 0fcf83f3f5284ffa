use assess_core::model::{
    Question, QuestionId, ResultId, ResultSummary, TestDefinition, TestId, TimeAllowance,
};
use services::InMemoryApi;

use super::test_harness::{ViewKind, setup_view_harness};

fn fractions_test() -> TestDefinition {
    TestDefinition::new(
        TestId::new("t1").unwrap(),
        "Fractions",
        TimeAllowance::from_secs(60),
        vec![
            Question::new(
                QuestionId::new("q1").unwrap(),
                "1/2 + 1/4?",
                vec!["3/4".into(), "2/6".into()],
            ),
            Question::new(
                QuestionId::new("q2").unwrap(),
                "1/3 of 9?",
                vec!["3".into(), "6".into()],
            ),
        ],
    )
    .unwrap()
}

#[tokio::test(flavor = "current_thread")]
async fn test_session_view_smoke_renders_loaded_test() {
    let api = InMemoryApi::new().with_test(fractions_test());
    let mut harness = setup_view_harness(ViewKind::TestSession("t1".into()), api);

    harness.settle().await;
    let html = harness.render();
    for expected in [
        "Fractions",
        "Question 1 of 2",
        "00:01:00",
        "0/2 Answered",
        "1/2 + 1/4?",
        "3/4",
        "Question Navigator",
        "Submit Test",
    ] {
        assert!(html.contains(expected), "missing {expected} in {html}");
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_session_view_smoke_offers_reload_when_test_is_missing() {
    let mut harness = setup_view_harness(ViewKind::TestSession("nope".into()), InMemoryApi::new());

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("The test could not be loaded."), "missing banner in {html}");
    assert!(html.contains("Reload test"), "missing retry in {html}");
    assert!(!html.contains("Question Navigator"), "navigator rendered in {html}");
    assert!(harness.api.submissions().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn result_view_smoke_renders_summary() {
    let api = InMemoryApi::new();
    api.insert_result(ResultSummary {
        id: ResultId::new("r1").unwrap(),
        score: 8.0,
        correct_answers: 8,
        total_questions: 10,
        time_spent_seconds: 125,
    });
    let mut harness = setup_view_harness(ViewKind::Result("r1".into()), api);

    harness.settle().await;
    let html = harness.render();
    for expected in ["Test Result", "8/10", "80% (A)", "tone-good", "2m 5s"] {
        assert!(html.contains(expected), "missing {expected} in {html}");
    }
}

#[tokio::test(flavor = "current_thread")]
async fn result_view_smoke_renders_not_found() {
    let mut harness = setup_view_harness(ViewKind::Result("missing".into()), InMemoryApi::new());

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("We could not find that"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}
