//! The reasoning loop controller.
//!
//! `ReactEngine` owns one configured loop: a generator, a tool registry,
//! a prompt manager, a failure sink, and an optional training collector,
//! all constructed explicitly by the process entry point and shared by
//! reference. `process_request` runs one session: state is created on
//! entry, dropped on exit, and never shared across requests, so any
//! number of sessions may run concurrently over the same engine.
//!
//! # Termination
//!
//! The loop exits through one of three doors:
//! - **FINAL**: the thought signals a final answer (lexical indicators),
//!   or contains no tool call at all, or its call markup is beyond
//!   repair (the thought degrades to a plain-text answer);
//! - **FALLBACK**: the step budget runs out; the response is a
//!   deterministic hedge embedding the accumulated context. Not an
//!   error.
//! - **Fatal**: the generator fails; the error propagates to the caller.
//!
//! There is no mid-step cancellation point: callers that need timeouts
//! should wrap `process_request` in `tokio::time::timeout`, which can
//! take effect at the generator and tool awaits between state changes.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use steward_core::{
    AgentResult, ChatMessage, DriftKind, Error, FailureSink, Generator, NullSink, ReasoningStep,
    StepKind, ToolCallRecord, ToolRegistry, TrainingSink,
};

use crate::parser::{self, ToolInvocation};
use crate::prompts::PromptManager;
use crate::session::{LoopState, call_signature};

/// Case-insensitive lexical markers that a thought is a final answer.
const FINAL_ANSWER_INDICATORS: &[&str] = &[
    "final answer",
    "the answer is",
    "conclusion",
    "based on the information",
    "therefore",
    "in conclusion",
];

/// Marker whose trailing text, when present, becomes the response.
const FINAL_ANSWER_MARKER: &str = "final answer:";

/// How many identical call signatures within one session trigger the
/// `infinite_loop` drift signal. The signal fires once, at the crossing;
/// the call is still executed.
const LOOP_SIGNATURE_THRESHOLD: usize = 3;

/// The default step budget.
const DEFAULT_MAX_STEPS: usize = 5;

/// The ReAct loop controller.
pub struct ReactEngine {
    /// The opaque text generator.
    generator: Arc<dyn Generator>,
    /// Registered capabilities.
    tools: Arc<ToolRegistry>,
    /// Few-shot prompt construction.
    prompts: PromptManager,
    /// Drift notification sink.
    failure_sink: Arc<dyn FailureSink>,
    /// Optional training-example collector.
    collector: Option<Arc<dyn TrainingSink>>,
    /// Maximum Think iterations per request.
    max_steps: usize,
}

impl ReactEngine {
    /// Create an engine with default settings (5 steps, 2 exemplars,
    /// drift discarded, no collection).
    pub fn new(generator: Arc<dyn Generator>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            generator,
            tools,
            prompts: PromptManager::default(),
            failure_sink: Arc::new(NullSink),
            collector: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Set the step budget (floored at 1).
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Set how many few-shot exemplars the step-0 prompt embeds.
    pub fn with_few_shot_limit(mut self, limit: usize) -> Self {
        self.prompts = PromptManager::new(limit);
        self
    }

    /// Attach a failure sink for drift notifications.
    pub fn with_failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.failure_sink = sink;
        self
    }

    /// Attach a training-example collector.
    pub fn with_collector(mut self, collector: Arc<dyn TrainingSink>) -> Self {
        self.collector = Some(collector);
        self
    }

    /// Process one user query through the full reasoning loop.
    pub async fn process_request(&self, query: &str) -> Result<AgentResult, Error> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let schemas = self.tools.schemas();

        let mut state = LoopState::new(query);
        let mut reasoning: Vec<ReasoningStep> = Vec::new();
        let mut tool_calls: Vec<ToolCallRecord> = Vec::new();
        let mut steps_taken = 0usize;
        let mut response: Option<String> = None;

        info!(request_id = %request_id, max_steps = self.max_steps, "processing agent request");

        while state.step < self.max_steps {
            let step_no = state.step + 1;

            // ── Think ──
            let prompt = if state.step == 0 {
                self.prompts.build_initial_prompt(query, &schemas)
            } else {
                self.prompts.build_continuation_prompt(&state.context)
            };
            let messages = vec![ChatMessage::user(prompt)];

            // Generator failure is fatal: propagate, do not absorb.
            let thought = self.generator.generate(&messages, &schemas).await?;
            steps_taken = step_no;
            debug!(request_id = %request_id, step = step_no, "thought generated");

            reasoning.push(
                ReasoningStep::new(step_no, StepKind::Think, thought.as_str())
                    .with_context(state.context.clone()),
            );

            // ── Decide: explicit final answer? ──
            if contains_final_indicator(&thought) {
                let answer = extract_final_answer(&thought);
                reasoning.push(ReasoningStep::new(step_no, StepKind::FinalAnswer, answer.as_str()));
                state.completed = true;
                response = Some(answer);
                break;
            }

            // ── Act ──
            match parser::parse_tool_call(&thought) {
                Ok(Some(ToolInvocation { name, arguments })) => {
                    if !self.tools.contains(&name) {
                        warn!(request_id = %request_id, tool = %name, "unknown tool referenced");
                        self.failure_sink.record_reasoning_failure(
                            DriftKind::UnknownTool,
                            json!({
                                "request_id": request_id,
                                "step": step_no,
                                "tool": name,
                            }),
                        );
                    }

                    let signature = call_signature(&name, &arguments);
                    let occurrences = state.record_signature(signature.clone());
                    if occurrences == LOOP_SIGNATURE_THRESHOLD {
                        warn!(request_id = %request_id, %signature, "repeated identical tool call");
                        self.failure_sink.record_reasoning_failure(
                            DriftKind::InfiniteLoop,
                            json!({
                                "request_id": request_id,
                                "step": step_no,
                                "signature": signature,
                                "occurrences": occurrences,
                            }),
                        );
                        // The call is still executed: short-circuiting with
                        // a cached result would change what the model sees.
                    }

                    reasoning.push(ReasoningStep::new(
                        step_no,
                        StepKind::Act,
                        format!("{}({})", name, serde_json::Value::Object(arguments.clone())),
                    ));

                    let observation = match self
                        .tools
                        .execute(&name, serde_json::Value::Object(arguments.clone()))
                        .await
                    {
                        Ok(result) => {
                            debug!(request_id = %request_id, tool = %name, "tool executed");
                            let observation = format!(
                                "Tool {} returned: {}",
                                name,
                                serde_json::Value::Object(result.clone())
                            );
                            tool_calls.push(ToolCallRecord::succeeded(&name, arguments, result));
                            observation
                        }
                        Err(e) => {
                            warn!(request_id = %request_id, tool = %name, error = %e, "tool failed");
                            let observation = format!("Tool {name} failed: {e}");
                            tool_calls.push(ToolCallRecord::failed(&name, arguments, e.to_string()));
                            observation
                        }
                    };

                    // ── Observe ──
                    reasoning.push(ReasoningStep::new(
                        step_no,
                        StepKind::Observe,
                        observation.as_str(),
                    ));
                    state.update_context(&thought, &observation);
                    state.advance();
                }
                Ok(None) => {
                    // Plain text, no call markers: the thought is the answer.
                    reasoning.push(ReasoningStep::new(
                        step_no,
                        StepKind::FinalAnswer,
                        thought.as_str(),
                    ));
                    state.completed = true;
                    response = Some(thought);
                    break;
                }
                Err(parse_err) => {
                    warn!(request_id = %request_id, error = %parse_err, "unrecoverable call markup");
                    self.failure_sink.record_reasoning_failure(
                        DriftKind::InvalidJson,
                        json!({
                            "request_id": request_id,
                            "step": step_no,
                            "error": parse_err.to_string(),
                        }),
                    );
                    // Degrade to the plain-text path.
                    reasoning.push(ReasoningStep::new(
                        step_no,
                        StepKind::FinalAnswer,
                        thought.as_str(),
                    ));
                    state.completed = true;
                    response = Some(thought);
                    break;
                }
            }
        }

        let response = response.unwrap_or_else(|| fallback_response(&state.context, self.max_steps));

        if let Some(collector) = &self.collector {
            let metadata = json!({
                "request_id": request_id,
                "generator": self.generator.name(),
                "steps_taken": steps_taken,
                "completed": state.completed,
                "duration_ms": started.elapsed().as_millis() as u64,
            });
            let accepted =
                collector.collect(query, &reasoning, &tool_calls, &response, metadata);
            debug!(request_id = %request_id, accepted, "session offered to training collector");
        }

        info!(
            request_id = %request_id,
            steps = steps_taken,
            tool_calls = tool_calls.len(),
            completed = state.completed,
            duration_ms = started.elapsed().as_millis() as u64,
            "agent request finished"
        );

        Ok(AgentResult {
            response,
            tool_calls,
            reasoning,
            steps_taken,
        })
    }
}

/// Whether the thought lexically signals a final answer.
fn contains_final_indicator(thought: &str) -> bool {
    let lower = thought.to_lowercase();
    FINAL_ANSWER_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
}

/// The text after a `final answer:` marker when present, else the whole
/// thought. The marker match is case-insensitive.
fn extract_final_answer(thought: &str) -> String {
    let lower = thought.to_lowercase();
    if let Some(idx) = lower.find(FINAL_ANSWER_MARKER) {
        // Lowercasing keeps byte offsets for ASCII text; if non-ASCII
        // content shifted them off a boundary, fall back to the whole
        // thought instead of slicing blind.
        if let Some(rest) = thought.get(idx + FINAL_ANSWER_MARKER.len()..) {
            return rest.trim().to_string();
        }
    }
    thought.trim().to_string()
}

/// The deterministic FALLBACK response for an exhausted step budget.
fn fallback_response(context: &str, max_steps: usize) -> String {
    format!(
        "I was unable to reach a final answer within {max_steps} reasoning steps. \
         Here is what I gathered so far:\n\n{context}\n\n\
         Please refine the request or break it into smaller questions."
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────
