//! Subcommand implementations.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use steward_agent::ReactEngine;
use steward_config::AppConfig;
use steward_core::StepKind;
use steward_telemetry::DriftMonitor;
use steward_tools::default_registry;
use steward_training::TrainingDataCollector;

use crate::replay::{ReplayGenerator, load_transcript};

/// `steward tools`: list registered tools.
pub fn tools(json: bool) -> Result<()> {
    let registry = default_registry();
    if json {
        println!("{}", serde_json::to_string_pretty(&registry.schemas())?);
    } else {
        for schema in registry.schemas() {
            println!("{:<24} {}", schema.name, schema.description);
        }
    }
    Ok(())
}

/// `steward kb <query>`: search the knowledge base directly.
pub async fn kb(query: &str, top_k: u64) -> Result<()> {
    let registry = default_registry();
    let result = registry
        .execute(
            "search_knowledge_base",
            serde_json::json!({"query": query, "top_k": top_k}),
        )
        .await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// `steward replay <transcript> <query>`: run the full loop against a
/// scripted generator, printing the trace, the response, and any drift.
pub async fn replay(config: &AppConfig, transcript: &Path, query: &str) -> Result<()> {
    let outputs = load_transcript(transcript)?;
    let generator = Arc::new(ReplayGenerator::new(outputs));
    let registry = Arc::new(default_registry());
    let monitor = Arc::new(DriftMonitor::new());

    let mut engine = ReactEngine::new(generator, registry)
        .with_max_steps(config.agent.max_steps)
        .with_few_shot_limit(config.agent.few_shot_examples)
        .with_failure_sink(monitor.clone());

    if config.training.enabled {
        let collector = TrainingDataCollector::new(config.training.output_file.clone())
            .with_min_quality_score(config.training.min_quality_score)
            .with_auto_save(config.training.auto_save);
        engine = engine.with_collector(Arc::new(collector));
    }

    let result = engine.process_request(query).await?;

    for step in &result.reasoning {
        let label = match step.kind {
            StepKind::Think => "think",
            StepKind::Act => "act",
            StepKind::Observe => "observe",
            StepKind::FinalAnswer => "final",
        };
        println!("[step {} {:>7}] {}", step.step, label, step.content);
    }
    println!();
    println!("response: {}", result.response);
    println!(
        "steps taken: {}, tool calls: {}",
        result.steps_taken,
        result.tool_calls.len()
    );

    let report = monitor.report();
    if report.total() > 0 {
        println!(
            "drift: invalid_json={} unknown_tool={} infinite_loop={}",
            report.invalid_json, report.unknown_tool, report.infinite_loop
        );
    }

    Ok(())
}
