use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    studio_draft_publisher_lib::run().await
}
