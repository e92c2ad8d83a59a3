// src/onboarding/wizard.rs
use serde::Serialize;
use thiserror::Error;

use super::OnboardingResult;
use crate::app_log;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[default]
    ResumeIntake,
    ProfileQuestionnaire,
    Completion,
}

impl Stage {
    pub const ALL: [Stage; 3] = [
        Stage::ResumeIntake,
        Stage::ProfileQuestionnaire,
        Stage::Completion,
    ];

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::ResumeIntake => Some(Stage::ProfileQuestionnaire),
            Stage::ProfileQuestionnaire => Some(Stage::Completion),
            Stage::Completion => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Catalog key for the progress bar label.
    pub fn label_key(self) -> &'static str {
        match self {
            Stage::ResumeIntake => "step_resume_upload",
            Stage::ProfileQuestionnaire => "step_info_collection",
            Stage::Completion => "step_complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardStep {
    /// Moved on to this stage.
    Advanced(Stage),
    /// The last stage completed; hand the result to the host.
    Finished(OnboardingResult),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Onboarding already finished")]
    AlreadyFinished,
}

/// Forward-only three-stage machine. Each stage completion merges its
/// partial result and moves to the next stage; completing the last stage
/// releases the accumulated result exactly once.
#[derive(Debug, Default)]
pub struct OnboardingWizard {
    stage: Stage,
    result: OnboardingResult,
    finished: bool,
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Accumulated data so far, e.g. to prefill the questionnaire.
    pub fn result(&self) -> &OnboardingResult {
        &self.result
    }

    /// `(current stage index, stage count)`
    pub fn progress(&self) -> (usize, usize) {
        (self.stage.index(), Stage::ALL.len())
    }

    pub fn complete_stage(&mut self, partial: OnboardingResult) -> Result<WizardStep, WizardError> {
        if self.finished {
            return Err(WizardError::AlreadyFinished);
        }

        self.result.merge(partial);

        match self.stage.next() {
            Some(next) => {
                app_log!(info, "Onboarding: {:?} -> {:?}", self.stage, next);
                self.stage = next;
                Ok(WizardStep::Advanced(next))
            }
            None => {
                self.finished = true;
                app_log!(info, "Onboarding complete");
                Ok(WizardStep::Finished(std::mem::take(&mut self.result)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::{Answer, Answers};
    use crate::ports::FixedDelayResumeParser;

    fn answers(pairs: &[(&str, &str)]) -> OnboardingResult {
        let map: Answers = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Answer::Single(v.to_string())))
            .collect();
        OnboardingResult::from_answers(map)
    }

    #[test]
    fn test_full_run_accumulates_union() {
        let mut wizard = OnboardingWizard::new();
        assert_eq!(wizard.stage(), Stage::ResumeIntake);
        assert_eq!(wizard.progress(), (0, 3));

        let resume = FixedDelayResumeParser::sample_profile();
        assert_eq!(
            wizard.complete_stage(OnboardingResult::from_resume(resume.clone())),
            Ok(WizardStep::Advanced(Stage::ProfileQuestionnaire))
        );
        assert_eq!(
            wizard.complete_stage(answers(&[("desired_city", "Hangzhou"), ("work_type", "Remote")])),
            Ok(WizardStep::Advanced(Stage::Completion))
        );

        let finished = wizard.complete_stage(OnboardingResult::default()).unwrap();
        let WizardStep::Finished(result) = finished else {
            panic!("expected the wizard to finish");
        };

        assert_eq!(result.resume, Some(resume));
        assert_eq!(result.answers.len(), 2);
        assert!(wizard.is_finished());
    }

    #[test]
    fn test_never_returns_to_resume_intake() {
        let mut wizard = OnboardingWizard::new();
        let mut visited = vec![wizard.stage()];

        while !wizard.is_finished() {
            if let Ok(WizardStep::Advanced(stage)) = wizard.complete_stage(OnboardingResult::default()) {
                visited.push(stage);
            }
        }

        assert_eq!(visited, Stage::ALL.to_vec());
        assert_eq!(
            visited.iter().filter(|s| **s == Stage::ResumeIntake).count(),
            1
        );
    }

    #[test]
    fn test_later_payload_overrides_same_key() {
        let mut wizard = OnboardingWizard::new();
        wizard
            .complete_stage(answers(&[("desired_city", "Beijing")]))
            .unwrap();
        wizard
            .complete_stage(answers(&[("desired_city", "Shenzhen"), ("salary_range", "25k-35k")]))
            .unwrap();

        assert_eq!(
            wizard.result().answers.get("desired_city"),
            Some(&Answer::Single("Shenzhen".into()))
        );
        assert_eq!(wizard.result().answers.len(), 2);
    }

    #[test]
    fn test_signal_after_finish_is_rejected() {
        let mut wizard = OnboardingWizard::new();
        for _ in 0..3 {
            wizard.complete_stage(OnboardingResult::default()).unwrap();
        }

        assert_eq!(
            wizard.complete_stage(OnboardingResult::default()),
            Err(WizardError::AlreadyFinished)
        );
        assert_eq!(wizard.stage(), Stage::Completion);
    }
}
