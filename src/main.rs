#[tokio::main]
async fn main() {
    color_eyre::install().expect("failed to install error report handler");
    let code = hex_validate::cli::run().await;
    std::process::exit(code);
}
