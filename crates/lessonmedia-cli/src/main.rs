//! Lesson media CLI: drive the media pipeline from the command line.
//!
//! Configuration comes from the environment (and `.env`); see `Config::from_env`.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use lessonmedia_cli::{print_json, read_upload, report_failure};
use lessonmedia_core::{AppError, Config, MediaKind};
use lessonmedia_infra::{init_telemetry, shutdown_telemetry, LogFormat};
use lessonmedia_links::{ExternalLinkResolver, ResolverOptions};
use lessonmedia_processing::LessonMediaService;
use lessonmedia_storage::{create_host, DeliveryUrlBuilder, IssueOptions, SignedUrlIssuer};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lessonmedia", about = "Lesson media pipeline CLI")]
struct Cli {
    /// Include the error chain in failure reports
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a lesson file (video, document, or image)
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
        /// Declared kind: video, document, image
        #[arg(long)]
        kind: MediaKind,
        /// Content type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        alt: Option<String>,
        #[arg(long)]
        caption: Option<String>,
    },
    /// Issue a signed URL for a private video
    Sign {
        /// Asset id, e.g. lessons/videos/<uuid>
        external_id: String,
        /// Validity window in seconds
        #[arg(long)]
        expiry: Option<u64>,
        /// Request the adaptive streaming manifest
        #[arg(long)]
        streaming: bool,
    },
    /// Check a signed URL
    VerifyUrl {
        url: String,
    },
    /// Resolve a video link to its canonical id
    Resolve {
        url: String,
        /// Check reachability with the provider
        #[arg(long)]
        verify: bool,
    },
    /// Show stored metadata of an asset
    Get {
        external_id: String,
    },
    /// Delete an asset
    Delete {
        external_id: String,
    },
}

fn issuer_from(config: &Config) -> SignedUrlIssuer {
    SignedUrlIssuer::new(
        DeliveryUrlBuilder::new(config.delivery_base_url()),
        config.signing_secret().as_bytes().to_vec(),
    )
}

async fn service_from(config: &Config) -> anyhow::Result<LessonMediaService> {
    let host = create_host(config)
        .await
        .context("Failed to initialise asset host")?;
    LessonMediaService::from_config(host, config)
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let verbose = cli.verbose;

    match cli.command {
        Commands::Upload {
            file,
            kind,
            content_type,
            alt,
            caption,
        } => {
            let (data, metadata) = read_upload(&file, content_type, alt, caption).await?;
            let service = service_from(&config).await?;
            let reference = service
                .attach_upload(data, kind, &metadata)
                .await
                .map_err(|e| report_failure(e, verbose))?;
            let playback_url = service.playback_url(&reference, &IssueOptions::with_expiry(config.signed_url_expiry()));
            print_json(&serde_json::json!({
                "media": reference,
                "playback_url": playback_url,
            }))?;
        }
        Commands::Sign {
            external_id,
            expiry,
            streaming,
        } => {
            let options = IssueOptions {
                expiry: expiry.map(Duration::from_secs).unwrap_or(config.signed_url_expiry()),
                streaming,
            };
            let signed = issuer_from(&config).issue(&external_id, &options);
            print_json(&serde_json::json!({
                "url": signed.url,
                "grant": signed.grant,
            }))?;
        }
        Commands::VerifyUrl { url } => {
            let outcome = issuer_from(&config).verify_url(&url, Utc::now());
            if let Err(e) = outcome {
                return Err(report_failure(AppError::Unauthorized(e.to_string()), verbose));
            }
            print_json(&serde_json::json!({ "valid": true }))?;
        }
        Commands::Resolve { url, verify } => {
            let resolver = ExternalLinkResolver::new(ResolverOptions::from_config(&config))?;
            let reference = if verify {
                resolver.resolve_verified(&url).await
            } else {
                resolver.resolve(&url)
            };
            let Some(reference) = reference else {
                return Err(report_failure(
                    AppError::InvalidInput(format!("Not a recognised video link: {}", url)),
                    verbose,
                ));
            };
            print_json(&serde_json::json!({
                "embed_url": resolver.embed_url(&reference.canonical_id),
                "thumbnail_url": resolver.thumbnail_url(&reference.canonical_id),
                "reference": reference,
            }))?;
        }
        Commands::Get { external_id } => {
            let service = service_from(&config).await?;
            let asset = service
                .uploader()
                .fetch(&external_id)
                .await
                .map_err(|e| report_failure(e, verbose))?;
            print_json(&asset)?;
        }
        Commands::Delete { external_id } => {
            let service = service_from(&config).await?;
            service
                .uploader()
                .delete(&external_id)
                .await
                .map_err(|e| report_failure(e, verbose))?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Asset {} deleted", external_id) }),
            )?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let log_format: LogFormat = config.log_format().parse()?;
    init_telemetry(log_format, config.environment())?;

    let result = run(cli, config).await;
    shutdown_telemetry().await;
    result
}
