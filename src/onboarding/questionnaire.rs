// src/onboarding/questionnaire.rs
//! Forward-only pointer over the preference questions

use serde::Serialize;
use thiserror::Error;

use super::{Answer, Answers};

/// Selecting this option switches the current question to free-text entry.
pub const OTHER_OPTION: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    pub options: Vec<String>,
    pub kind: QuestionKind,
    pub placeholder: String,
}

impl Question {
    pub fn new(id: &str, title: &str, kind: QuestionKind, options: &[&str], placeholder: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            kind,
            placeholder: placeholder.to_string(),
        }
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionnaireStep {
    /// Moved to the question at this index.
    Advanced(usize),
    /// Waiting for free text for the current question.
    CustomInputRequested,
    /// The current multi-select answer changed; still on the same question.
    SelectionChanged,
    /// The last question was answered.
    Finished(Answers),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuestionnaireError {
    #[error("Questionnaire already finished")]
    AlreadyFinished,
    #[error("'{0}' is not an option for this question")]
    UnknownOption(String),
    #[error("Custom answer cannot be empty")]
    EmptyCustomInput,
    #[error("Pick at least one option before continuing")]
    NoSelection,
    #[error("Only multi-select questions advance explicitly")]
    NotMultiSelect,
    #[error("Finish or cancel the custom answer first")]
    CustomInputActive,
    #[error("No custom answer is being entered")]
    NotInCustomInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Options,
    CustomText,
}

#[derive(Debug, Clone)]
pub struct Questionnaire {
    questions: Vec<Question>,
    index: usize,
    answers: Answers,
    mode: InputMode,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::new(Self::default_questions())
    }
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            index: 0,
            answers: Answers::new(),
            mode: InputMode::Options,
        }
    }

    /// Start from answers collected earlier; the pointer still begins at the
    /// first question.
    pub fn with_answers(mut self, answers: Answers) -> Self {
        self.answers = answers;
        self
    }

    pub fn default_questions() -> Vec<Question> {
        use QuestionKind::{Multiple, Single};

        vec![
            Question::new(
                "desired_position",
                "What position are you looking for?",
                Single,
                &["Frontend Engineer", "Backend Engineer", "Full-stack Engineer", "Product Manager", OTHER_OPTION],
                "Enter the position you want",
            ),
            Question::new(
                "desired_city",
                "Which city do you want to work in?",
                Single,
                &["Beijing", "Shanghai", "Shenzhen", "Hangzhou", "Guangzhou", OTHER_OPTION],
                "Enter the city you want",
            ),
            Question::new(
                "salary_range",
                "What salary range do you expect?",
                Single,
                &["10k-15k", "15k-25k", "25k-35k", "35k-50k", "50k+", OTHER_OPTION],
                "Enter your expected salary range",
            ),
            Question::new(
                "work_type",
                "What type of work do you want?",
                Single,
                &["Full-time", "Part-time", "Internship", "Remote", OTHER_OPTION],
                "Enter the work type you want",
            ),
            Question::new(
                "interested_companies",
                "Which companies interest you?",
                Multiple,
                &["ByteDance", "Tencent", "Alibaba", "Baidu", "Meituan", "JD.com", OTHER_OPTION],
                "Enter a company you are interested in",
            ),
        ]
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    pub fn is_entering_custom(&self) -> bool {
        self.mode == InputMode::CustomText
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn current_answer(&self) -> Option<&Answer> {
        self.current().and_then(|q| self.answers.get(&q.id))
    }

    /// `(1-based position, total)`; position stays at `total` once finished.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.questions.len();
        ((self.index + 1).min(total), total)
    }

    /// Pick an option on the current question.
    pub fn select(&mut self, option: &str) -> Result<QuestionnaireStep, QuestionnaireError> {
        let question = self.current_question()?.clone();
        if self.mode == InputMode::CustomText {
            return Err(QuestionnaireError::CustomInputActive);
        }
        if !question.has_option(option) {
            return Err(QuestionnaireError::UnknownOption(option.to_string()));
        }

        if option == OTHER_OPTION {
            self.mode = InputMode::CustomText;
            return Ok(QuestionnaireStep::CustomInputRequested);
        }

        match question.kind {
            QuestionKind::Single => {
                self.answers
                    .insert(question.id.clone(), Answer::Single(option.to_string()));
                Ok(self.advance())
            }
            QuestionKind::Multiple => {
                self.toggle(&question.id, option);
                Ok(QuestionnaireStep::SelectionChanged)
            }
        }
    }

    /// Commit free text for the current question. Single-select questions
    /// advance; multi-select questions add the value and go back to the options.
    pub fn submit_custom(&mut self, text: &str) -> Result<QuestionnaireStep, QuestionnaireError> {
        let question = self.current_question()?.clone();
        if self.mode != InputMode::CustomText {
            return Err(QuestionnaireError::NotInCustomInput);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(QuestionnaireError::EmptyCustomInput);
        }

        self.mode = InputMode::Options;
        match question.kind {
            QuestionKind::Single => {
                self.answers
                    .insert(question.id.clone(), Answer::Single(text.to_string()));
                Ok(self.advance())
            }
            QuestionKind::Multiple => {
                let values = self.multi_values(&question.id);
                if !values.iter().any(|v| v == text) {
                    values.push(text.to_string());
                }
                Ok(QuestionnaireStep::SelectionChanged)
            }
        }
    }

    /// Leave free-text entry without committing anything.
    pub fn back_to_options(&mut self) -> Result<(), QuestionnaireError> {
        self.current_question()?;
        if self.mode != InputMode::CustomText {
            return Err(QuestionnaireError::NotInCustomInput);
        }
        self.mode = InputMode::Options;
        Ok(())
    }

    /// Drop one value from the current multi-select answer.
    pub fn remove_answer(&mut self, value: &str) -> Result<QuestionnaireStep, QuestionnaireError> {
        let question = self.current_question()?.clone();
        if question.kind != QuestionKind::Multiple {
            return Err(QuestionnaireError::NotMultiSelect);
        }

        self.multi_values(&question.id).retain(|v| v != value);
        Ok(QuestionnaireStep::SelectionChanged)
    }

    /// Continue past a multi-select question; needs at least one value.
    pub fn next(&mut self) -> Result<QuestionnaireStep, QuestionnaireError> {
        let question = self.current_question()?.clone();
        if question.kind != QuestionKind::Multiple {
            return Err(QuestionnaireError::NotMultiSelect);
        }
        if self.mode == InputMode::CustomText {
            return Err(QuestionnaireError::CustomInputActive);
        }

        let has_selection = matches!(
            self.answers.get(&question.id),
            Some(Answer::Multiple(values)) if !values.is_empty()
        );
        if !has_selection {
            return Err(QuestionnaireError::NoSelection);
        }

        Ok(self.advance())
    }

    fn current_question(&self) -> Result<&Question, QuestionnaireError> {
        self.current().ok_or(QuestionnaireError::AlreadyFinished)
    }

    fn advance(&mut self) -> QuestionnaireStep {
        self.index += 1;
        self.mode = InputMode::Options;

        if self.is_finished() {
            QuestionnaireStep::Finished(self.answers.clone())
        } else {
            QuestionnaireStep::Advanced(self.index)
        }
    }

    fn toggle(&mut self, question_id: &str, option: &str) {
        let values = self.multi_values(question_id);
        if let Some(pos) = values.iter().position(|v| v == option) {
            values.remove(pos);
        } else {
            values.push(option.to_string());
        }
    }

    /// The multi-select value list for `question_id`, replacing any
    /// single-valued answer left by prefilled data.
    fn multi_values(&mut self, question_id: &str) -> &mut Vec<String> {
        let entry = self
            .answers
            .entry(question_id.to_string())
            .or_insert_with(|| Answer::Multiple(Vec::new()));

        if let Answer::Single(value) = entry {
            let value = std::mem::take(value);
            *entry = Answer::Multiple(vec![value]);
        }

        match entry {
            Answer::Multiple(values) => values,
            Answer::Single(_) => unreachable!("single answer converted above"),
        }
    }
}
