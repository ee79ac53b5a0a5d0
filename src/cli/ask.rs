//! CLI command: one chat completion with cost report
//!
//! Shared by `ask`, `grammar`, `ielts` and `toefl`: loads the parameter
//! profile, builds the client from the safebox, submits one call and prints
//! the answer with its cost.

use super::LlmArgs;
use anyhow::Context;
use tutorly_llm::{
    CostInfo, CostScope, JobKind, LlmClient, ModelParams, ParamOverrides, Prompt, Provider,
    Safebox,
};

/// Parameter profiles used when `--config` is not given
const DEFAULT_CONFIG: &str = include_str!("../../config/llm.yaml");

/// Run one completion
pub async fn run(llm: &LlmArgs, prompt: Prompt) -> anyhow::Result<()> {
    let provider = Provider::resolve(llm.provider.as_deref())?;
    let params = load_params(llm)?;
    // .env was loaded at startup
    let safebox = Safebox::from_process_env();

    let mut client = LlmClient::from_safebox(provider, &safebox, params, prompt)
        .with_context(|| format!("Failed to create {provider} client"))?;

    let response = client
        .submit(JobKind::ChatCompletion)
        .await
        .context("LLM request failed")?;

    println!("{}", response.text().unwrap_or_default());

    if let CostInfo::Aggregated(usage) = client.cost_info(CostScope::Aggregated, None)? {
        println!();
        println!(
            "  Tokens: {} in / {} out  |  Cost: USD {:.5}",
            usage.overall_input_tokens, usage.overall_output_tokens, usage.overall_total_cost
        );
    }

    if llm.json {
        println!("{}", serde_json::to_string_pretty(&client.metadata())?);
    }

    Ok(())
}

fn load_params(llm: &LlmArgs) -> anyhow::Result<ModelParams> {
    let params = match &llm.config {
        Some(path) => ModelParams::load(path, &llm.profile)
            .with_context(|| format!("Failed to load profile from {}", path.display()))?,
        None => ModelParams::from_yaml_str(DEFAULT_CONFIG, &llm.profile)?,
    };

    let overrides = ParamOverrides {
        model: llm.model.clone(),
        temperature: llm.temperature,
        max_tokens: llm.max_tokens,
        ..Default::default()
    };
    Ok(params.with_overrides(&overrides)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(profile: &str) -> LlmArgs {
        LlmArgs {
            provider: Some("openai".to_string()),
            config: None,
            profile: profile.to_string(),
            model: None,
            temperature: None,
            max_tokens: None,
            json: false,
        }
    }

    #[test]
    fn test_embedded_profiles_load() {
        for profile in ["default", "creative_writing", "code_generation", "gemini"] {
            let params = load_params(&args(profile)).unwrap();
            assert!(!params.model.is_empty(), "{profile} has no model");
            let table = tutorly_llm::price_table();
            assert!(
                Provider::ALL
                    .iter()
                    .any(|provider| table.contains(*provider, &params.model)),
                "{profile} uses an unpriced model"
            );
        }
    }

    #[test]
    fn test_overrides_applied() {
        let mut llm = args("default");
        llm.model = Some("gpt-4o".to_string());
        llm.max_tokens = Some(64);

        let params = load_params(&llm).unwrap();
        assert_eq!(params.model, "gpt-4o");
        assert_eq!(params.max_tokens, 64);
        assert_eq!(params.temperature, 0.7);
    }

    #[test]
    fn test_missing_profile() {
        let err = load_params(&args("poetry")).unwrap_err();
        assert!(err.to_string().contains("poetry"));
    }
}
