use colored::Colorize;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = sipatani::run() {
        eprintln!("{} {}", "✗".red().bold(), e);
        if e.is_storage() {
            eprintln!("{}", "  No changes were saved; the operation was rolled back.".dimmed());
        }
        std::process::exit(1);
    }
}
