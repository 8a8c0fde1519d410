use anyhow::{Context, Result};
use gazetteer_names::{
    batch, config::Config, error::RemoteError, name::NameContext, name::ValidationOptions,
    translit::Transliterator, upload, HttpPlaceRegistry, HttpTransliterator,
    VocabularyCatalog,
};
use gazetteer_names::batch::DerivationPasses;
use gazetteer_names::detect::UnicodeScriptDetector;
use tracing::{info, warn};

/// Stand-in used when no transliteration service is configured. Every
/// call fails, which the engine treats like an unreachable service.
struct UnconfiguredTransliterator;

impl Transliterator for UnconfiguredTransliterator {
    async fn transliterate(
        &self,
        _text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, RemoteError> {
        Err(RemoteError::Status {
            url: "transliterator://unconfigured".to_string(),
            status: 503,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gazetteer_names=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .context("usage: gazetteer-names <input.json> [output.json]")?;
    let output_path = args.next().unwrap_or_else(|| "updates.json".to_string());

    info!("Starting name batch run for {}", input_path);

    let config = Config::from_env()?;

    let input = std::fs::read_to_string(&input_path)
        .with_context(|| format!("could not read {}", input_path))?;
    let raws: Vec<gazetteer_names::RawNameRecord> =
        serde_json::from_str(&input).context("input is not a JSON array of name records")?;
    info!("Read {} records", raws.len());

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let registry = HttpPlaceRegistry::new(client.clone(), &config.registry_base_url);

    let outcome = match &config.transliterator_url {
        Some(url) => {
            let transliterator = HttpTransliterator::new(client, url.clone());
            run(&config, &registry, &transliterator, &raws).await
        }
        None => {
            warn!("TRANSLITERATOR_URL is not set; non-Latin names cannot be romanized remotely");
            run(&config, &registry, &UnconfiguredTransliterator, &raws).await
        }
    };

    let document = upload::document_for(&outcome.records);
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(&output_path, json)
        .with_context(|| format!("could not write {}", output_path))?;

    info!(
        "Wrote {} updates to {} ({} records failed)",
        outcome.records.len(),
        output_path,
        outcome.failures.len()
    );
    Ok(())
}

async fn run<T: Transliterator>(
    config: &Config,
    registry: &HttpPlaceRegistry,
    transliterator: &T,
    raws: &[gazetteer_names::RawNameRecord],
) -> batch::BatchOutcome {
    let catalog = VocabularyCatalog::default();
    let detector = UnicodeScriptDetector;
    let options = ValidationOptions {
        skip_remote_checks: config.skip_remote_checks,
        relaxed_normalization: config.relaxed_normalization,
    };
    let ctx = NameContext::new(&catalog, &detector, transliterator, registry, options);
    let passes = DerivationPasses {
        romanize: config.romanize,
        sluggify: config.sluggify,
        summarize: config.summarize,
    };
    batch::process_batch(raws, &ctx, passes).await
}
