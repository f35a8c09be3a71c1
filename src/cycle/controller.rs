//! Cycle Controller
//!
//! Drives draft → {critique → decide → refine}* until a critique is
//! accepted or the iteration budget runs out.
//!
//! ## Iteration `i`
//!
//! 1. Ask the generator to critique the current draft
//! 2. Score the critique and cross-validate the draft
//! 3. Combine both into a decision
//! 4. Accepted: stop and return the draft that was critiqued
//! 5. Rejected: ask for a refinement, record an [`IterationMetric`], continue
//!
//! Running out of iterations is not a failure: the last draft is returned
//! with [`RunStatus::Exhausted`]. Generation failures abort the run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::output::{OutputWriter, PersistedOutput};
use super::state::{CycleState, Phase};
use crate::ai::{GenerationGateway, PromptTemplates, clean_markdown_response};
use crate::analyzer::{
    CodeElementIndex, ExtractorRegistry, FileScanner, ProjectType, SourceFile,
    detect_project_type, read_sources,
};
use crate::config::OutputFormat;
use crate::critique::{Decision, ScoreCombiner, SemanticScorer};
use crate::types::{DocError, IterationMetric, Result};
use crate::verifier::CrossValidator;

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// Where the code under documentation comes from
#[derive(Debug, Clone)]
pub enum ProjectSource {
    /// Discover and read files under `root`
    Directory {
        root: PathBuf,
        max_files: usize,
        /// Detected from indicator files when absent
        project_type: Option<ProjectType>,
        read_concurrency: usize,
    },
    /// Files already in memory
    Snapshot {
        project_type: ProjectType,
        files: Vec<SourceFile>,
    },
}

/// Read-only view of the project for one run
#[derive(Debug, Clone)]
pub struct Analysis {
    pub project_type: ProjectType,
    pub files: Vec<SourceFile>,
    pub index: CodeElementIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// Accepted at critique round `iteration`
    Accepted { iteration: u32 },
    /// No critique was accepted within `iterations` rounds
    Exhausted { iterations: u32 },
}

impl RunStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted { iteration } => write!(f, "accepted at iteration {}", iteration),
            Self::Exhausted { iterations } => {
                write!(f, "iteration budget exhausted after {}", iterations)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub documentation: String,
    pub status: RunStatus,
    pub metrics: Vec<IterationMetric>,
    pub decisions: Vec<Decision>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// =============================================================================
// Capability Interface
// =============================================================================

/// The stages of one documentation run.
///
/// [`DocumentationAgent::run`] composes the other stages; implementors only
/// supply the stages.
#[async_trait]
pub trait DocumentationAgent: Send + Sync {
    async fn analyze(&self) -> Result<Analysis>;

    /// Produce the initial draft
    async fn draft(&self, analysis: &Analysis, state: CycleState) -> Result<CycleState>;

    /// Critique the current draft for round `iteration`
    async fn critique(&self, state: CycleState, iteration: u32) -> Result<(CycleState, String)>;

    /// Score, validate and decide; never fails
    fn decide(&self, analysis: &Analysis, state: CycleState, critique: &str) -> CycleState;

    /// Replace the current draft with a refinement guided by `critique`
    async fn refine(
        &self,
        analysis: &Analysis,
        state: CycleState,
        critique: &str,
        started: Instant,
    ) -> Result<CycleState>;

    async fn persist(&self, outcome: &RunOutcome) -> Result<PersistedOutput>;

    async fn run(&self, max_iterations: u32) -> Result<RunOutcome> {
        let started_at = Utc::now();
        let analysis = self.analyze().await?;
        let mut state = self.draft(&analysis, CycleState::new()).await?;

        for iteration in 1..=max_iterations {
            let round_start = Instant::now();
            info!("Critique iteration {}/{}", iteration, max_iterations);

            let (critiqued, critique) = self.critique(state, iteration).await?;
            state = self.decide(&analysis, critiqued, &critique);

            if state.phase == Phase::Accepted {
                info!("Documentation accepted at iteration {}", iteration);
                break;
            }

            state = self.refine(&analysis, state, &critique, round_start).await?;
        }

        let status = if state.phase == Phase::Accepted {
            RunStatus::Accepted {
                iteration: state.iteration,
            }
        } else {
            warn!(
                "No critique accepted within {} iterations; keeping the last draft",
                max_iterations
            );
            state = state.exhausted();
            RunStatus::Exhausted {
                iterations: max_iterations,
            }
        };

        Ok(RunOutcome {
            documentation: state.draft.text,
            status,
            metrics: state.metrics,
            decisions: state.decisions,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

// =============================================================================
// Controller
// =============================================================================

pub struct CycleController {
    source: ProjectSource,
    gateway: Arc<GenerationGateway>,
    model: String,
    format: OutputFormat,
    registry: ExtractorRegistry,
    scorer: SemanticScorer,
    validator: CrossValidator,
    combiner: ScoreCombiner,
    writer: Option<OutputWriter>,
}

impl CycleController {
    pub fn new(
        source: ProjectSource,
        gateway: Arc<GenerationGateway>,
        model: impl Into<String>,
        combiner: ScoreCombiner,
    ) -> Result<Self> {
        Ok(Self {
            source,
            gateway,
            model: model.into(),
            format: OutputFormat::default(),
            registry: ExtractorRegistry::with_defaults()?,
            scorer: SemanticScorer::new()?,
            validator: CrossValidator::new()?,
            combiner,
            writer: None,
        })
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_writer(mut self, writer: OutputWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn with_validator(mut self, validator: CrossValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn gateway(&self) -> &GenerationGateway {
        &self.gateway
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let text = self.gateway.call(prompt, &self.model).await?;
        Ok(clean_markdown_response(&text))
    }
}

#[async_trait]
impl DocumentationAgent for CycleController {
    #[instrument(skip_all)]
    async fn analyze(&self) -> Result<Analysis> {
        let (project_type, files) = match &self.source {
            ProjectSource::Snapshot {
                project_type,
                files,
            } => (*project_type, files.clone()),
            ProjectSource::Directory {
                root,
                max_files,
                project_type,
                read_concurrency,
            } => {
                let project_type = project_type.unwrap_or_else(|| detect_project_type(root));
                let scanner = FileScanner::new(root)
                    .with_project_type(project_type)
                    .with_max_files(*max_files);
                let paths = scanner.scan()?;
                info!(
                    "Discovered {} files ({} project)",
                    paths.len(),
                    project_type
                );
                let files = read_sources(root, paths, *read_concurrency).await;
                (project_type, files)
            }
        };

        if files.is_empty() {
            return Err(DocError::Analysis(
                "No readable source files found".to_string(),
            ));
        }

        let index = CodeElementIndex::build(&self.registry, &files);
        let fidelity = index.fidelity_summary();
        info!(
            files = files.len(),
            elements = index.len(),
            exact = fidelity.exact_files,
            heuristic = fidelity.heuristic_files,
            "Code element index built"
        );

        Ok(Analysis {
            project_type,
            files,
            index,
        })
    }

    #[instrument(skip_all)]
    async fn draft(&self, analysis: &Analysis, state: CycleState) -> Result<CycleState> {
        let prompt = PromptTemplates::draft(
            analysis.project_type,
            self.format,
            &analysis.files,
            &analysis.index,
        );
        let text = self.generate(&prompt).await?;
        info!("Initial draft: {} chars", text.chars().count());
        Ok(state.drafted(text))
    }

    #[instrument(skip_all, fields(iteration = iteration))]
    async fn critique(&self, state: CycleState, iteration: u32) -> Result<(CycleState, String)> {
        let prompt = PromptTemplates::critique(&state.draft.text);
        let critique = self.gateway.call(&prompt, &self.model).await?;
        debug!("Critique: {} chars", critique.len());
        Ok((state.critiqued(iteration), critique))
    }

    fn decide(&self, analysis: &Analysis, state: CycleState, critique: &str) -> CycleState {
        let assessment = self.scorer.assess(critique);
        let issues = self.validator.validate(&analysis.index, &state.draft.text);
        let decision = self.combiner.decide(&assessment, &issues);

        for issue in issues.iter().filter(|i| i.is_error()) {
            debug!("Validation error: {}", issue.description);
        }
        info!(
            accepted = decision.accepted,
            final_score = decision.final_score,
            errors = decision.errors,
            warnings = decision.warnings,
            "Decision: {}",
            decision.reason
        );

        state.decided(decision)
    }

    #[instrument(skip_all, fields(iteration = state.iteration))]
    async fn refine(
        &self,
        analysis: &Analysis,
        state: CycleState,
        critique: &str,
        started: Instant,
    ) -> Result<CycleState> {
        let prompt = PromptTemplates::refine(&state.draft.text, critique, &analysis.files);
        let text = self.generate(&prompt).await?;

        let metric = IterationMetric::new(state.iteration, started.elapsed(), text.chars().count());
        info!(
            "Iteration {} refined draft: {} chars in {:.1}s",
            metric.iteration, metric.draft_length, metric.elapsed_secs
        );
        Ok(state.refined(text, metric))
    }

    async fn persist(&self, outcome: &RunOutcome) -> Result<PersistedOutput> {
        match &self.writer {
            Some(writer) => writer.write(outcome).await,
            None => Err(DocError::Config(
                "No output destination configured".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RetryPolicy;
    use crate::ai::provider::testing::ScriptedProvider;
    use crate::critique::DecisionReason;
    use crate::types::{ErrorCategory, IssueType, ValidationIssue};
    use crate::verifier::ClaimRule;
    use std::time::Duration;
    use tempfile::TempDir;

    const NEGATIVE: &str = "The documentation is incomplete and missing key sections. \
                            It is confusing and poorly organized.";
    const POSITIVE: &str = "The documentation is excellent and requires no changes.";

    fn snapshot() -> ProjectSource {
        ProjectSource::Snapshot {
            project_type: ProjectType::Backend,
            files: vec![SourceFile::new(
                "calculator.py",
                "def calculate_sum(a, b):\n    \"\"\"Add two numbers.\"\"\"\n    return a + b\n",
            )],
        }
    }

    fn controller(provider: Arc<ScriptedProvider>) -> CycleController {
        let policy = RetryPolicy {
            max_retries: 1,
            retry_delay: Duration::ZERO,
            timeout: Duration::from_secs(30),
        };
        let gateway = Arc::new(GenerationGateway::new(provider, None, policy));
        CycleController::new(snapshot(), gateway, "test-model", ScoreCombiner::new(0.8).unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepts_draft_critiqued_at_third_iteration() {
        let provider = Arc::new(ScriptedProvider::replies([
            "# Draft v0",
            NEGATIVE,
            "# Draft v1",
            NEGATIVE,
            "# Draft v2",
            POSITIVE,
        ]));
        let outcome = controller(provider.clone()).run(3).await.unwrap();

        assert_eq!(outcome.documentation, "# Draft v2");
        assert_eq!(outcome.status, RunStatus::Accepted { iteration: 3 });
        assert_eq!(outcome.metrics.len(), 2);
        assert_eq!(outcome.metrics[0].iteration, 1);
        assert_eq!(outcome.metrics[1].iteration, 2);
        assert_eq!(outcome.decisions.len(), 3);
        assert_eq!(provider.calls(), 6);
    }

    struct PlaceholderRule;

    impl ClaimRule for PlaceholderRule {
        fn name(&self) -> &'static str {
            "placeholder"
        }

        fn claims(&self, documentation: &str) -> Vec<String> {
            documentation
                .match_indices("FIXME")
                .map(|(_, m)| m.to_string())
                .collect()
        }

        fn check(&self, documentation: &str, _index: &CodeElementIndex) -> Vec<ValidationIssue> {
            self.claims(documentation)
                .into_iter()
                .map(|_| {
                    ValidationIssue::error(
                        IssueType::ClaimMismatch,
                        "Placeholder left in documentation",
                        "Replace the placeholder",
                    )
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn test_custom_claim_rules_feed_decisions() {
        let provider = Arc::new(ScriptedProvider::replies(["# Draft\n\nFIXME", POSITIVE]));
        let validator = CrossValidator::new()
            .unwrap()
            .with_rule(Box::new(PlaceholderRule));
        let outcome = controller(provider)
            .with_validator(validator)
            .run(1)
            .await
            .unwrap();

        assert_eq!(outcome.decisions[0].errors, 1);
        assert_eq!(outcome.decisions[0].reason, DecisionReason::ExplicitApproval);
    }

    #[tokio::test]
    async fn test_immediate_acceptance_returns_initial_draft() {
        let provider = Arc::new(ScriptedProvider::replies(["```markdown\n# Only draft\n```", POSITIVE]));
        let outcome = controller(provider).run(3).await.unwrap();

        assert_eq!(outcome.documentation, "# Only draft");
        assert_eq!(outcome.status, RunStatus::Accepted { iteration: 1 });
        assert!(outcome.metrics.is_empty());
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_refinement() {
        let provider = Arc::new(ScriptedProvider::replies([
            "# v0", NEGATIVE, "# v1", NEGATIVE, "# v2",
        ]));
        let outcome = controller(provider).run(2).await.unwrap();

        assert_eq!(outcome.documentation, "# v2");
        assert_eq!(outcome.status, RunStatus::Exhausted { iterations: 2 });
        assert_eq!(outcome.metrics.len(), 2);
        assert!(outcome.decisions.iter().all(|d| !d.accepted));
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_run() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok("# v0".to_string()),
            Err(DocError::Llm(crate::types::LlmError::new(
                ErrorCategory::Auth,
                "bad key",
            ))),
        ]));
        let err = controller(provider).run(3).await.unwrap_err();
        assert!(err.is_generation_failure());
    }

    #[tokio::test]
    async fn test_empty_snapshot_is_an_analysis_error() {
        let policy = RetryPolicy {
            max_retries: 1,
            retry_delay: Duration::ZERO,
            timeout: Duration::from_secs(1),
        };
        let gateway = Arc::new(GenerationGateway::new(
            Arc::new(ScriptedProvider::replies(Vec::<&str>::new())),
            None,
            policy,
        ));
        let source = ProjectSource::Snapshot {
            project_type: ProjectType::Mixed,
            files: Vec::new(),
        };
        let controller =
            CycleController::new(source, gateway, "m", ScoreCombiner::new(0.8).unwrap()).unwrap();
        assert!(matches!(controller.run(1).await, Err(DocError::Analysis(_))));
    }

    #[tokio::test]
    async fn test_directory_source_and_persist() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("app.py"),
            "def serve(port):\n    \"\"\"Start serving.\"\"\"\n    pass\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask\n").unwrap();

        let provider = Arc::new(ScriptedProvider::replies(["# App docs", POSITIVE]));
        let policy = RetryPolicy {
            max_retries: 1,
            retry_delay: Duration::ZERO,
            timeout: Duration::from_secs(30),
        };
        let gateway = Arc::new(GenerationGateway::new(provider.clone(), None, policy));
        let source = ProjectSource::Directory {
            root: dir.path().to_path_buf(),
            max_files: 10,
            project_type: None,
            read_concurrency: 2,
        };
        let out = dir.path().join("out/docs.md");
        let controller = CycleController::new(source, gateway, "m", ScoreCombiner::new(0.8).unwrap())
            .unwrap()
            .with_writer(OutputWriter::new(&out));

        let analysis = controller.analyze().await.unwrap();
        assert_eq!(analysis.project_type, ProjectType::Backend);
        assert_eq!(analysis.files[0].path, "requirements.txt");
        assert!(analysis.index.contains_exact("serve"));

        let outcome = controller.run(2).await.unwrap();
        let persisted = controller.persist(&outcome).await.unwrap();
        assert_eq!(std::fs::read_to_string(persisted.document).unwrap(), "# App docs");
        assert!(persisted.report.exists());

        let prompts = provider.prompts();
        assert!(prompts[0].contains("def serve(port)"));
    }
}
