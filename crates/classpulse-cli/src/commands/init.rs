//! The `classpulse init` command.

use std::path::Path;

use anyhow::Result;

use classpulse_providers::config::{starter_config, CONFIG_FILE_NAME};

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, starter_config())?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    println!("\nNext steps:");
    println!("  1. Export ANTHROPIC_API_KEY (without it, quizzes come from the offline pool)");
    println!("  2. Run: classpulse demo --output roster.json");
    println!("  3. Run: classpulse quiz --roster roster.json --student student-001 --topic radicals");

    Ok(())
}
