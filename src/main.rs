use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = castfolio::run().await {
        eprintln!("castfolio: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
