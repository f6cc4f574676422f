//! avs-capture — command-line capture runner
//!
//! Drives a full capture run from a directory of photos: validates the
//! operator token, sequences the selected category's steps, runs every file
//! through the acceptance and duplicate checks in order, and submits the
//! finished bundle to the configured sink (remote verification API or local
//! directory).

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use avs_capture::config::CaptureConfig;
use avs_capture::frame::{DirectoryFrameSource, FrameSource};
use avs_capture::sink::{HttpSink, LocalSink, SubmissionSink};
use avs_capture::token::{HttpTokenValidator, StaticTokenValidator, TokenValidator};
use avs_capture::{CaptureSession, Error, SessionState};

#[derive(Parser, Debug)]
#[command(
    name = "avs-capture",
    about = "Capture a verification photo sequence and submit the bundle"
)]
struct Args {
    /// Goods category (selects the required photo sequence)
    #[arg(long)]
    category: String,

    /// Operator access token
    #[arg(long, env = "AVS_TOKEN", default_value = "offline")]
    token: String,

    /// Directory of photos, consumed in file-name order
    #[arg(long)]
    input: PathBuf,

    /// Output directory for the local sink (used without --api-url)
    #[arg(long, default_value = "submissions")]
    output: PathBuf,

    /// Remote API base URL; when set, token validation and submission go
    /// over HTTP
    #[arg(long, env = "AVS_API_URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting avs-capture");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = CaptureConfig::load(args.config.as_deref())?;
    let catalog = config.catalog()?;
    let api_url = args.api_url.clone().or_else(|| config.api_base_url.clone());

    let validator: Box<dyn TokenValidator> = match &api_url {
        Some(url) => Box::new(HttpTokenValidator::new(url.clone())?),
        None => Box::new(StaticTokenValidator::always_valid()),
    };

    let mut session = CaptureSession::start(
        &args.category,
        &catalog,
        config.limits,
        &args.token,
        validator.as_ref(),
    )
    .await?;

    let mut frames = DirectoryFrameSource::new(&args.input)?;
    info!(frames = frames.remaining(), steps = session.steps().len(), "Capture run starting");

    while session.state() != SessionState::ReadyForSubmission {
        let step = session.current_step();
        let label = session.current_label().unwrap_or_default().to_string();

        let frame = match frames.acquire_frame().await {
            Ok(frame) => frame,
            Err(Error::Device(reason)) => {
                warn!(step, label = %label, %reason, "Out of frames before the sequence completed");
                anyhow::bail!("capture incomplete: step {} ({}) has no accepted photo", step, label);
            }
            Err(e) => return Err(e.into()),
        };
        let source = frame.source.clone();

        match session.capture(frame).await {
            Ok(()) => {
                session.advance()?;
                info!(step, label = %label, source = %source, "Step accepted");
            }
            Err(Error::Validation(reason)) => {
                warn!(step, source = %source, code = reason.code(), "Photo rejected; trying next file");
            }
            Err(Error::Duplicate { step: dup_step, .. }) => {
                warn!(step, source = %source, duplicate_of = dup_step, "Duplicate photo rejected; trying next file");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let sink: Box<dyn SubmissionSink> = match &api_url {
        Some(url) => Box::new(HttpSink::new(url.clone(), args.token.clone())?),
        None => Box::new(LocalSink::new(args.output.clone())),
    };

    let bundle = session.submit(sink.as_ref()).await?;
    info!(bundle_id = %bundle.bundle_id, "Submission complete");

    Ok(())
}
