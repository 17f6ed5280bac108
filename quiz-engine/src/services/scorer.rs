use crate::models::{AnswerRecord, PerQuestionResult, Question};

/// The scorer's aggregate output: one verdict per question plus the
/// correct/incorrect totals. Pure data, produced once per session.
#[derive(Debug, Clone)]
pub struct Tally {
    pub verdicts: Vec<PerQuestionResult>,
    pub correct_count: u32,
    pub incorrect_count: u32,
}

/// Score a finished question sequence against the submitted answers.
/// Unanswered questions are incorrect and carry an empty submitted answer.
/// Pure and side-effect free.
pub fn tally(questions: &[Question], answers: &AnswerRecord) -> Tally {
    let mut verdicts = Vec::with_capacity(questions.len());
    let mut correct_count = 0;
    let mut incorrect_count = 0;

    for question in questions {
        let submitted = answers.get(question.id());
        let correct = submitted.is_some_and(|answer| is_correct(question, answer));
        if correct {
            correct_count += 1;
        } else {
            incorrect_count += 1;
        }

        verdicts.push(PerQuestionResult {
            flashcard_id: question.id().to_string(),
            prompt: question.prompt().to_string(),
            expected_answer: question.expected_answer_text(),
            submitted_answer: submitted.unwrap_or_default().to_string(),
            kind: question.kind(),
            correct,
        });
    }

    Tally {
        verdicts,
        correct_count,
        incorrect_count,
    }
}

/// Identification answers compare case-insensitively after trimming; the
/// other kinds compare exactly. No fuzzy matching, no partial credit.
pub fn is_correct(question: &Question, submitted: &str) -> bool {
    match question {
        Question::Identification {
            expected_answer, ..
        } => submitted.trim().to_lowercase() == expected_answer.trim().to_lowercase(),
        Question::TrueFalse {
            expected_answer, ..
        } => submitted == expected_answer.to_string(),
        Question::MultipleChoice {
            expected_answer, ..
        } => submitted == expected_answer,
    }
}

/// `round(correct / total * 100)` as an integer percentage.
pub fn aggregate_score(correct_count: u32, total_questions: u32) -> u8 {
    if total_questions == 0 {
        return 0;
    }
    ((correct_count as f64 / total_questions as f64) * 100.0).round() as u8
}
