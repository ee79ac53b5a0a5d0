//! CLI command: `tutorly prices`
//!
//! Lists the models each provider client accepts with their prices.

use tutorly_llm::{price_table, ModelPricing, Provider};

/// Run the prices subcommand.
pub fn run(provider: Option<Provider>, json: bool) -> anyhow::Result<()> {
    let providers = match provider {
        Some(p) => vec![p],
        None => Provider::ALL.to_vec(),
    };
    let models: Vec<&ModelPricing> = providers
        .into_iter()
        .flat_map(|p| price_table().models(p))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!();
    println!("  Model Prices (USD per 1M tokens)");
    println!("  {}", "-".repeat(72));
    println!(
        "  {:<8} {:<32} {:>9} {:>9} {:>10}",
        "Provider", "Model", "Input", "Output", "Context"
    );
    println!("  {}", "-".repeat(72));
    for pricing in &models {
        let context = pricing
            .context_window
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<8} {:<32} {:>9.4} {:>9.4} {:>10}",
            pricing.provider.as_str(),
            pricing.model,
            pricing.input_cost_per_million,
            pricing.output_cost_per_million,
            context
        );
    }
    println!();

    Ok(())
}
