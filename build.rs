use std::env;

fn main() {
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-env-changed=MOCKPREP_API_BASE");

    // Load .env file during build so the default service URL can be baked in
    if let Err(e) = dotenvy::dotenv() {
        println!(
            "cargo:warning=BUILD.RS: Failed to load .env file: {}. Using system environment variables.",
            e
        );
    }

    // Embedded as the compile-time default; runtime config still overrides it
    if let Ok(api_base) = env::var("MOCKPREP_API_BASE") {
        println!("cargo:rustc-env=MOCKPREP_API_BASE={}", api_base);
        println!("cargo:warning=Embedded MOCKPREP_API_BASE ({})", api_base);
    }
}
