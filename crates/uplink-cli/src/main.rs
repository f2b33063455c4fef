//! `uplink` binary entrypoint.

#[tokio::main]
async fn main() {
    let code = uplink_cli::run().await;
    std::process::exit(code);
}
