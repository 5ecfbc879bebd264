use pf_domain::config::Config;
use pf_providers::ProviderRegistry;

/// Print the roster in trial order, flagging entries whose provider did
/// not initialize.
pub fn print(config: &Config) {
    let roster = config.llm.roster();
    if roster.is_empty() {
        println!("roster is empty: add [[llm.roster]] entries to the config");
        return;
    }

    let registry = ProviderRegistry::from_config(&config.llm);
    println!("{:<4} {:<40} {:<5} {:<10} status", "#", "model", "tier", "json_mode");
    for (index, model) in roster.iter().enumerate() {
        let status = if registry.contains(model.provider_id()) {
            "ready"
        } else {
            "provider unavailable"
        };
        println!(
            "{:<4} {:<40} {:<5} {:<10} {}",
            index,
            model.id,
            model.tier,
            if model.supports_strict_json_mode { "yes" } else { "no" },
            status,
        );
    }
}
