#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("\n=== Starting MockPrep ===");
    if let Err(e) = mockprep_lib::run().await {
        eprintln!("Error running application: {:#}", e);
        std::process::exit(1);
    }
}
