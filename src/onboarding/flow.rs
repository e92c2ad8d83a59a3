// src/onboarding/flow.rs
//! Drives the wizard end to end: resume upload, questionnaire, completion

use std::collections::{HashMap, VecDeque};
use thiserror::Error;

use super::questionnaire::{
    Question, QuestionKind, Questionnaire, QuestionnaireError, QuestionnaireStep, OTHER_OPTION,
};
use super::wizard::{OnboardingWizard, WizardError, WizardStep};
use super::OnboardingResult;
use crate::app_log;
use crate::ports::{with_retry, PortError, ResumeParser, RetryPolicy};
use crate::types::ResumeUpload;

/// Upper bound on responder actions for one questionnaire run.
const MAX_ACTIONS: usize = 256;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OnboardingError {
    #[error("Resume intake failed: {0}")]
    ResumeIntake(#[from] PortError),

    #[error(transparent)]
    Questionnaire(#[from] QuestionnaireError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("No answer given for question '{0}'")]
    Unanswered(String),

    #[error("Questionnaire did not finish after {0} actions")]
    TooManyActions(usize),
}

/// One user action on the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Select(String),
    Custom(String),
    Remove(String),
    BackToOptions,
    Next,
}

/// The user side of the questionnaire. Returning `None` means the user
/// walked away from the current question.
pub trait QuestionnaireResponder: Send {
    fn respond(&mut self, question: &Question, questionnaire: &Questionnaire) -> Option<Response>;
}

/// Answers from a prepared `question id -> values` map. Values that are not
/// preset options are entered through "Other".
#[derive(Debug, Default)]
pub struct ScriptedResponder {
    script: HashMap<String, Vec<String>>,
    pending: HashMap<String, VecDeque<Response>>,
}

impl ScriptedResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, question_id: &str, values: &[&str]) -> Self {
        self.script.insert(
            question_id.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn insert(&mut self, question_id: String, values: Vec<String>) {
        self.script.insert(question_id, values);
    }

    /// Selecting a preset twice would toggle it back off, so repeated values
    /// are planned once.
    fn plan(question: &Question, values: &[String]) -> VecDeque<Response> {
        let mut actions = VecDeque::new();
        let mut seen: Vec<&str> = Vec::new();
        for value in values {
            if seen.contains(&value.as_str()) {
                continue;
            }
            seen.push(value);
            if value != OTHER_OPTION && question.has_option(value) {
                actions.push_back(Response::Select(value.clone()));
            } else {
                actions.push_back(Response::Select(OTHER_OPTION.to_string()));
                actions.push_back(Response::Custom(value.clone()));
            }
            if question.kind == QuestionKind::Single {
                break;
            }
        }
        if question.kind == QuestionKind::Multiple {
            actions.push_back(Response::Next);
        }
        actions
    }
}

impl QuestionnaireResponder for ScriptedResponder {
    fn respond(&mut self, question: &Question, _questionnaire: &Questionnaire) -> Option<Response> {
        if !self.pending.contains_key(&question.id) {
            let values = self.script.get(&question.id)?;
            let plan = Self::plan(question, values);
            self.pending.insert(question.id.clone(), plan);
        }
        self.pending.get_mut(&question.id)?.pop_front()
    }
}

pub struct OnboardingFlow<'a> {
    parser: &'a dyn ResumeParser,
    retry: RetryPolicy,
}

impl<'a> OnboardingFlow<'a> {
    pub fn new(parser: &'a dyn ResumeParser, retry: RetryPolicy) -> Self {
        Self { parser, retry }
    }

    /// Run all three stages and return the accumulated result.
    pub async fn run(
        &self,
        upload: &ResumeUpload,
        mut questionnaire: Questionnaire,
        responder: &mut dyn QuestionnaireResponder,
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<OnboardingResult, OnboardingError> {
        let mut wizard = OnboardingWizard::new();

        let resume = with_retry(self.retry, "parse resume", || {
            self.parser.parse(upload, progress)
        })
        .await?;
        wizard.complete_stage(OnboardingResult::from_resume(resume))?;

        let answers = Self::answer_questionnaire(&mut questionnaire, responder)?;
        wizard.complete_stage(OnboardingResult::from_answers(answers))?;

        match wizard.complete_stage(OnboardingResult::default())? {
            WizardStep::Finished(result) => Ok(result),
            WizardStep::Advanced(stage) => {
                app_log!(error, "Wizard advanced to {:?} after the last stage", stage);
                Err(OnboardingError::Wizard(WizardError::AlreadyFinished))
            }
        }
    }

    fn answer_questionnaire(
        questionnaire: &mut Questionnaire,
        responder: &mut dyn QuestionnaireResponder,
    ) -> Result<super::Answers, OnboardingError> {
        if questionnaire.is_finished() {
            return Ok(questionnaire.answers().clone());
        }

        for _ in 0..MAX_ACTIONS {
            let question = match questionnaire.current() {
                Some(question) => question.clone(),
                None => return Ok(questionnaire.answers().clone()),
            };

            let response = responder
                .respond(&question, questionnaire)
                .ok_or_else(|| OnboardingError::Unanswered(question.id.clone()))?;

            let step = match response {
                Response::Select(option) => questionnaire.select(&option)?,
                Response::Custom(text) => questionnaire.submit_custom(&text)?,
                Response::Remove(value) => questionnaire.remove_answer(&value)?,
                Response::BackToOptions => {
                    questionnaire.back_to_options()?;
                    QuestionnaireStep::SelectionChanged
                }
                Response::Next => questionnaire.next()?,
            };

            if let QuestionnaireStep::Finished(answers) = step {
                return Ok(answers);
            }
        }

        Err(OnboardingError::TooManyActions(MAX_ACTIONS))
    }
}
