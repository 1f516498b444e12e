//! `sumarelay check` — Print a configuration summary without serving.

use sumarelay_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("SUMA Relay — Configuration Check");
    println!("================================\n");

    let mut issues = 0;

    match AppConfig::load() {
        Ok(config) => {
            println!("  ok  Configuration valid");
            println!("      Listen: {}:{}", config.gateway.host, config.gateway.port);
            println!("      Model: {}", config.openai.model);

            if config.has_api_key() {
                println!("  ok  Completion API key configured");
            } else {
                println!("  !!  No OPENAI_API_KEY — chat endpoints will answer 500");
                issues += 1;
            }

            if config.contact_relay_ready() {
                println!("  ok  Contact email relay configured");
            } else {
                println!("  !!  Contact relay incomplete — set RESEND_API_KEY, CONTACT_TO_EMAIL, CONTACT_FROM_EMAIL");
                issues += 1;
            }

            if config.knowledge_path.exists() {
                println!("  ok  Knowledge text: {}", config.knowledge_path.display());
            } else {
                println!(
                    "  !!  Knowledge text missing at {} — placeholder will be used",
                    config.knowledge_path.display()
                );
                issues += 1;
            }

            if config.gateway.site_root.exists() {
                println!("  ok  Site root: {}", config.gateway.site_root.display());
            } else {
                println!(
                    "  !!  Site root missing at {} — static requests will 404",
                    config.gateway.site_root.display()
                );
                issues += 1;
            }
        }
        Err(e) => {
            println!("  xx  Configuration invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
