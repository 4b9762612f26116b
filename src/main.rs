// src/main.rs

use docrun::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let result = match logging::init_logging(args.log_level) {
        Ok(()) => run(args).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        eprintln!("docrun error: {err}");
        std::process::exit(err.exit_code());
    }
}
