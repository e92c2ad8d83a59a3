// src/onboarding/mod.rs
//! First-run onboarding: resume intake, preference questionnaire, completion

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ResumeProfile;

pub mod flow;
pub mod questionnaire;
pub mod wizard;

pub use flow::{OnboardingError, OnboardingFlow, QuestionnaireResponder, Response, ScriptedResponder};
pub use questionnaire::{
    Question, QuestionKind, Questionnaire, QuestionnaireError, QuestionnaireStep, OTHER_OPTION,
};
pub use wizard::{OnboardingWizard, Stage, WizardError, WizardStep};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    /// Distinct values in the order they were picked.
    Multiple(Vec<String>),
}

impl Answer {
    pub fn values(&self) -> Vec<&str> {
        match self {
            Answer::Single(value) => vec![value.as_str()],
            Answer::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

pub type Answers = BTreeMap<String, Answer>;

/// What the wizard has collected so far. Stage payloads use the same type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingResult {
    pub resume: Option<ResumeProfile>,
    pub answers: Answers,
}

impl OnboardingResult {
    pub fn from_resume(resume: ResumeProfile) -> Self {
        Self {
            resume: Some(resume),
            answers: Answers::new(),
        }
    }

    pub fn from_answers(answers: Answers) -> Self {
        Self {
            resume: None,
            answers,
        }
    }

    /// Fold `partial` in: its resume (if any) and its answers win over what
    /// was there, everything else is kept.
    pub fn merge(&mut self, partial: OnboardingResult) {
        if partial.resume.is_some() {
            self.resume = partial.resume;
        }
        self.answers.extend(partial.answers);
    }
}
