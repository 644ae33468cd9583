use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let msg = err.to_string().to_lowercase();

    if msg.contains("invalid agent name") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Agent names cannot be empty, start with '.', or contain '/', '\\', ':' or '..'.");
    }

    if msg.contains("lock") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Another process may hold the memory index. Retry once it exits.");
    }

    if msg.contains("invalid configuration") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Check jautmem.toml in the memory root.");
    }

    std::process::exit(1);
}
