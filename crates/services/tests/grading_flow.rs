use std::sync::Arc;

use assess_core::model::{AnswerCopyId, LetterGrade, QuestionId, RubricItem, ScoreSheet, TopicId};
use services::{GradingService, InMemoryApi};

fn qid(id: &str) -> QuestionId {
    QuestionId::new(id).unwrap()
}

#[tokio::test]
async fn grading_posts_total_grade_and_recommendations() {
    let api = InMemoryApi::new();
    let grading = GradingService::new(Arc::new(api.clone()));

    let mut sheet = ScoreSheet::new(vec![
        RubricItem {
            question_id: qid("q1"),
            topic_id: Some(TopicId::new("geometry").unwrap()),
            max_score: 10,
        },
        RubricItem {
            question_id: qid("q2"),
            topic_id: None,
            max_score: 10,
        },
    ])
    .unwrap();
    sheet.mark_right(&qid("q1")).unwrap();
    sheet.set_score(&qid("q2"), 25).unwrap();
    sheet.set_score(&qid("q2"), 4).unwrap();

    let copy = AnswerCopyId::new("copy-7").unwrap();
    let sent = grading
        .submit(copy.clone(), &sheet, "  Revise triangles. ")
        .await
        .unwrap();

    assert_eq!(sent.score, 14);
    assert_eq!(sent.grade, LetterGrade::BPlus);
    assert_eq!(sent.feedback, "Revise triangles.");
    assert_eq!(sent.recommendations.len(), 1);
    assert_eq!(sent.recommendations[0].question_id, qid("q2"));

    let recorded = api.grades();
    assert_eq!(recorded, vec![sent]);
    assert_eq!(recorded[0].answer_copy_id, copy);
}

#[tokio::test]
async fn grading_totals_marks_past_the_u32_range() {
    let api = InMemoryApi::new();
    let grading = GradingService::new(Arc::new(api.clone()));

    let mut sheet = ScoreSheet::new(vec![
        RubricItem {
            question_id: qid("q1"),
            topic_id: None,
            max_score: u32::MAX,
        },
        RubricItem {
            question_id: qid("q2"),
            topic_id: None,
            max_score: 1,
        },
    ])
    .unwrap();
    sheet.mark_right(&qid("q1")).unwrap();
    sheet.mark_right(&qid("q2")).unwrap();

    let sent = grading
        .submit(AnswerCopyId::new("copy-8").unwrap(), &sheet, "")
        .await
        .unwrap();

    assert_eq!(sent.score, u64::from(u32::MAX) + 1);
    assert_eq!(sent.grade, LetterGrade::APlus);
    assert!(sent.recommendations.is_empty());
    assert_eq!(api.grades(), vec![sent]);
}
