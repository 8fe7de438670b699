//! Retry Orchestrator: drives the classification loop.
//!
//! States: `Attempting(k)` for k = 1..=max_attempts, then one of the terminal outcomes
//! `Accepted`, `Exhausted` or `Failed`.
//!
//! Each attempt: gateway call → parse → validate. A valid candidate is accepted at once.
//! An invalid one triggers the next attempt with `base prompt + correction for this
//! attempt's rejections`. After the last attempt the candidate is kept anyway; normalization
//! (run on every successful exit) drops whatever is still invalid. Gateway and parse
//! failures end the run immediately and are never retried here.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::analysis::correction::build_correction_prompt;
use crate::analysis::models::AnalysisResult;
use crate::analysis::normalizer::{normalize_with, CodeFallback};
use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::analysis::schema::analysis_schema;
use crate::analysis::validator::{detect_invalid_codes, ValidationResult};
use crate::llm_client::prompts::{FIDELITY_INSTRUCTION, LANGUAGE_INSTRUCTION};
use crate::llm_client::{GenerationGateway, LlmError, OutputSchema};
use crate::vocabulary::{Scheme, Vocabulary};

/// Attempts per request unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Terminal state of one classification run.
#[derive(Debug)]
pub enum RetryOutcome {
    /// A candidate passed validation.
    Accepted {
        candidate: AnalysisResult,
        attempts: u32,
    },
    /// Every attempt was rejected; `candidate` is the last one.
    Exhausted {
        candidate: AnalysisResult,
        attempts: u32,
        validation: ValidationResult,
    },
    /// The gateway failed or its output did not parse.
    Failed { attempt: u32, error: LlmError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationStatus {
    Accepted,
    Exhausted,
}

/// Normalized result of a successful run.
#[derive(Debug, Clone)]
pub struct ClassifiedAnalysis {
    pub analysis: AnalysisResult,
    pub attempts: u32,
    pub status: ClassificationStatus,
}

impl RetryOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Accepted { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
            RetryOutcome::Failed { attempt, .. } => *attempt,
        }
    }

    /// Normalizes the outcome's candidate. Normalization runs for accepted results too:
    /// validation checks membership only, not descriptions.
    pub fn finalize(
        self,
        vocabulary: &Vocabulary,
        fallback: CodeFallback,
    ) -> Result<ClassifiedAnalysis, LlmError> {
        match self {
            RetryOutcome::Accepted {
                candidate,
                attempts,
            } => Ok(ClassifiedAnalysis {
                analysis: normalize_with(vocabulary, &candidate, fallback),
                attempts,
                status: ClassificationStatus::Accepted,
            }),
            RetryOutcome::Exhausted {
                candidate,
                attempts,
                validation,
            } => {
                warn!(
                    "Dropping {} invalid value(s) from the last candidate ({:?}): tags={:?} bisac={:?} thema={:?} ibic={:?}",
                    validation.rejected_count(),
                    fallback,
                    validation.invalid_tags,
                    validation.invalid_bisac,
                    validation.invalid_thema,
                    validation.invalid_ibic
                );
                Ok(ClassifiedAnalysis {
                    analysis: normalize_with(vocabulary, &candidate, fallback),
                    attempts,
                    status: ClassificationStatus::Exhausted,
                })
            }
            RetryOutcome::Failed { error, .. } => Err(error),
        }
    }
}

enum AttemptState {
    Attempting { attempt: u32, prompt: String },
    Finished(RetryOutcome),
}

/// One orchestrator per request; cheap to build from shared state.
#[derive(Clone)]
pub struct ClassificationOrchestrator {
    gateway: Arc<dyn GenerationGateway>,
    vocabulary: Arc<Vocabulary>,
    schema: OutputSchema,
    max_attempts: u32,
    fallback: CodeFallback,
}

impl ClassificationOrchestrator {
    pub fn new(gateway: Arc<dyn GenerationGateway>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            gateway,
            vocabulary,
            schema: analysis_schema(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            fallback: CodeFallback::default(),
        }
    }

    /// At least one attempt is always made.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_fallback(mut self, fallback: CodeFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Full pipeline for one manuscript: base prompt → retry loop → normalization.
    pub async fn classify(
        &self,
        manuscript: &str,
        word_count: u64,
    ) -> Result<ClassifiedAnalysis, LlmError> {
        let base_prompt = build_analysis_prompt(&self.vocabulary, manuscript, word_count);
        let outcome = self.run(&base_prompt).await;
        debug!("Classification run ended after {} attempt(s)", outcome.attempts());
        outcome.finalize(&self.vocabulary, self.fallback)
    }

    /// Runs the attempt state machine to a terminal outcome.
    pub async fn run(&self, base_prompt: &str) -> RetryOutcome {
        let mut state = AttemptState::Attempting {
            attempt: 1,
            prompt: base_prompt.to_string(),
        };

        loop {
            state = match state {
                AttemptState::Attempting { attempt, prompt } => {
                    self.step(base_prompt, attempt, &prompt).await
                }
                AttemptState::Finished(outcome) => return outcome,
            };
        }
    }

    async fn step(&self, base_prompt: &str, attempt: u32, prompt: &str) -> AttemptState {
        info!("Classification attempt {}/{}", attempt, self.max_attempts);

        let candidate = match self.generate_candidate(prompt).await {
            Ok(candidate) => candidate,
            Err(error) => {
                error!(
                    "Classification attempt {}/{} failed: {error}",
                    attempt, self.max_attempts
                );
                return AttemptState::Finished(RetryOutcome::Failed { attempt, error });
            }
        };

        let validation = detect_invalid_codes(&self.vocabulary, &candidate);

        if validation.is_valid {
            info!("Classification accepted on attempt {}", attempt);
            return AttemptState::Finished(RetryOutcome::Accepted {
                candidate,
                attempts: attempt,
            });
        }

        warn!(
            "Classification attempt {}/{} rejected {} value(s): tags={:?} bisac={:?} thema={:?} ibic={:?}",
            attempt,
            self.max_attempts,
            validation.rejected_count(),
            validation.invalid_tags,
            validation.invalid_bisac,
            validation.invalid_thema,
            validation.invalid_ibic
        );

        if attempt < self.max_attempts {
            let prompt = format!("{base_prompt}{}", build_correction_prompt(&validation));
            return AttemptState::Attempting {
                attempt: attempt + 1,
                prompt,
            };
        }

        warn!("Classification exhausted after {} attempts", attempt);
        AttemptState::Finished(RetryOutcome::Exhausted {
            candidate,
            attempts: attempt,
            validation,
        })
    }

    async fn generate_candidate(&self, prompt: &str) -> Result<AnalysisResult, LlmError> {
        let value = self
            .gateway
            .generate(ANALYSIS_SYSTEM, prompt, &self.schema)
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Fills the analysis template with the full vocabulary and the manuscript.
/// The manuscript goes in last so its text can never be mistaken for a placeholder.
pub fn build_analysis_prompt(vocabulary: &Vocabulary, manuscript: &str, word_count: u64) -> String {
    let tag_list = vocabulary
        .tags()
        .iter()
        .map(|tag| format!("\"{tag}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let code_list = |scheme: Scheme| -> String {
        vocabulary
            .codes(scheme)
            .entries()
            .iter()
            .map(|entry| format!("{}: {}", entry.code, entry.description))
            .collect::<Vec<_>>()
            .join("\n")
    };

    ANALYSIS_PROMPT_TEMPLATE
        .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
        .replace("{language_instruction}", LANGUAGE_INSTRUCTION)
        .replace("{word_count}", &word_count.to_string())
        .replace("{tag_list}", &tag_list)
        .replace("{bisac_list}", &code_list(Scheme::Bisac))
        .replace("{thema_list}", &code_list(Scheme::Thema))
        .replace("{ibic_list}", &code_list(Scheme::Ibic))
        .replace("{manuscript}", manuscript)
}
