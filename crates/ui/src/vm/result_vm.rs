use assess_core::countdown::format_compact;
use assess_core::model::ResultSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultTone {
    Excellent,
    Good,
    Fair,
    Pass,
    Poor,
}

impl ResultTone {
    #[must_use]
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Self::Excellent,
            80..=89 => Self::Good,
            70..=79 => Self::Fair,
            60..=69 => Self::Pass,
            _ => Self::Poor,
        }
    }

    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Excellent => "tone-excellent",
            Self::Good => "tone-good",
            Self::Fair => "tone-fair",
            Self::Pass => "tone-pass",
            Self::Poor => "tone-poor",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub score_label: String,
    pub percentage_label: String,
    pub tone: ResultTone,
    pub correct: u32,
    pub incorrect: u32,
    pub time_label: String,
}

impl From<&ResultSummary> for ResultVm {
    fn from(result: &ResultSummary) -> Self {
        let percentage = result.percentage();
        Self {
            score_label: format!("{}/{}", format_score(result.score), result.total_questions),
            percentage_label: format!("{percentage}% ({})", result.grade()),
            tone: ResultTone::for_percentage(percentage),
            correct: result.correct_answers,
            incorrect: result.incorrect_answers(),
            time_label: format_compact(result.time_spent_seconds),
        }
    }
}

fn format_score(score: f64) -> String {
    if score.fract().abs() < f64::EPSILON {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}
