use anyhow::Result;
use clap::Parser;
use nutriscan::ai::mime::encode_data_uri;
use nutriscan::models::{AnalysisRequest, Config, DietaryPreference, ToneMode};
use nutriscan::scan::FoodScanner;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "nutriscan")]
#[command(about = "Estimate nutrition facts from a food photo")]
struct CliArgs {
    /// Image file to analyze, or `-` to read base64 / a data URI from stdin.
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Language for the food name and tips (e.g. en, ko, ja).
    #[arg(long, default_value = "en")]
    language: String,

    /// Dietary preference to check the food against.
    #[arg(long, value_enum, default_value_t = DietaryPreference::None)]
    diet: DietaryPreference,

    /// Roast the meal instead of giving a polite tip.
    #[arg(long)]
    roast: bool,
}

fn load_image(path: &Path) -> nutriscan::Result<String> {
    if path == Path::new("-") {
        let mut encoded = String::new();
        std::io::stdin().read_to_string(&mut encoded)?;
        return Ok(encoded);
    }

    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(nutriscan::Error::Generic(format!(
            "Image file '{}' is empty",
            path.display()
        )));
    }
    Ok(encode_data_uri(&bytes))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutriscan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let image = match load_image(&args.image) {
        Ok(image) => image,
        Err(e) => {
            error!("Failed to read image {}: {}", args.image.display(), e);
            std::process::exit(1);
        }
    };

    let scanner = FoodScanner::from_config(&config);
    let tone = if args.roast {
        ToneMode::Roast
    } else {
        ToneMode::Standard
    };
    let request = AnalysisRequest::new(image)
        .with_language(args.language)
        .with_dietary_preference(args.diet)
        .with_tone(tone);

    let result = scanner.analyze(&request).await;
    info!("Scan complete (is_food={})", result.is_food());

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
