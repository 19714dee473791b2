use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use idverify_core::pipeline::infrastructure::service_factory::{build_services, ModelPaths};
use idverify_core::pipeline::infrastructure::threaded_request_executor::ThreadedRequestExecutor;
use idverify_core::pipeline::verification_request::{
    RequestHandler, VerificationRequest, VerificationResponse,
};
use idverify_core::shared::config::VerificationConfig;
use idverify_core::shared::constants::{
    FACE_MODEL_NAME, HAND_LANDMARK_MODEL_NAME, PALM_MODEL_NAME,
};
use idverify_core::shared::error::VerificationError;
use idverify_core::shared::model_resolver;

/// Identity onboarding checks: ID document OCR and gesture-PIN video
/// verification with face liveness.
#[derive(Parser)]
#[command(name = "idverify")]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalOptions {
    /// Directory holding one sub-directory per user.
    #[arg(long, global = true, default_value = ".")]
    users_dir: PathBuf,

    /// JSON configuration file (defaults to the platform config location).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory searched for model files after the cache.
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Base URL models are downloaded from when not found locally.
    #[arg(long, global = true)]
    model_base_url: Option<String>,

    /// Tesseract tessdata directory.
    #[arg(long, global = true)]
    tessdata_dir: Option<PathBuf>,

    /// Minimum SSIM between the document face and every sampled video face.
    #[arg(long, global = true)]
    liveness_threshold: Option<f64>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, global = true)]
    face_confidence: Option<f64>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// OCR the user's ID document, extract fields and save the document face.
    Document {
        /// User identifier (sub-directory of --users-dir).
        user: String,
    },
    /// Verify the gestured PIN and face liveness in the user's recorded video.
    Otp {
        user: String,
        /// The PIN the user was asked to show.
        pin: String,
    },
    /// Run a JSON Lines file of requests on a worker pool.
    Batch {
        /// One request per line, e.g. {"request":"otp","user":"u1","pin":"4821"}
        requests: PathBuf,

        /// Worker threads; each loads its own models.
        #[arg(long, default_value = "2")]
        workers: usize,
    },
}

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Returns whether every request was processed.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.options)?;
    let options = cli.options;

    match cli.command {
        Command::Document { user } => {
            let request = VerificationRequest::Document { user };
            let response = run_single(&config, &options.users_dir, &request);
            print_json(&response, options.pretty)?;
            Ok(response.is_ok())
        }
        Command::Otp { user, pin } => {
            let request = VerificationRequest::Otp { user, pin };
            let response = run_single(&config, &options.users_dir, &request);
            print_json(&response, options.pretty)?;
            Ok(response.is_ok())
        }
        Command::Batch { requests, workers } => {
            let requests = read_requests(&requests)?;
            let models = resolve_models(&config)?;
            let users_dir = options.users_dir.as_path();
            let factory = |worker: usize| -> Result<Box<dyn RequestHandler>, VerificationError> {
                log::debug!("Building services for worker {worker}");
                Ok(Box::new(build_services(&config, &models, users_dir, false)?))
            };

            let responses = ThreadedRequestExecutor::new(workers).execute(requests, &factory);
            print_json(&responses, options.pretty)?;
            Ok(responses.iter().all(VerificationResponse::is_ok))
        }
    }
}

fn run_single(
    config: &VerificationConfig,
    users_dir: &Path,
    request: &VerificationRequest,
) -> VerificationResponse {
    let services = resolve_models(config)
        .and_then(|models| build_services(config, &models, users_dir, true));
    match services {
        Ok(mut services) => services.handle(request),
        Err(e) => {
            log::error!("Could not set up verification services: {e}");
            VerificationResponse::failed(request, e.kind(), &e.to_string())
        }
    }
}

fn load_config(options: &GlobalOptions) -> Result<VerificationConfig, Box<dyn std::error::Error>> {
    let mut config = VerificationConfig::load(options.config.as_deref())?;
    if let Some(dir) = &options.models_dir {
        config.models_dir = Some(dir.clone());
    }
    if let Some(url) = &options.model_base_url {
        config.model_base_url = Some(url.clone());
    }
    if let Some(dir) = &options.tessdata_dir {
        config.tessdata_dir = Some(dir.clone());
    }
    if let Some(threshold) = options.liveness_threshold {
        config.liveness_threshold = threshold;
    }
    if let Some(confidence) = options.face_confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(format!(
                "Face confidence must be between 0.0 and 1.0, got {confidence}"
            )
            .into());
        }
        config.face_confidence = confidence;
    }
    config.validate()?;
    Ok(config)
}

fn resolve_models(config: &VerificationConfig) -> Result<ModelPaths, VerificationError> {
    Ok(ModelPaths {
        face: resolve_model(config, FACE_MODEL_NAME)?,
        palm: resolve_model(config, PALM_MODEL_NAME)?,
        hand_landmark: resolve_model(config, HAND_LANDMARK_MODEL_NAME)?,
    })
}

fn resolve_model(config: &VerificationConfig, name: &'static str) -> Result<PathBuf, VerificationError> {
    log::info!("Resolving model: {name}");
    let progress: model_resolver::ProgressFn =
        Box::new(move |downloaded, total| download_progress(name, downloaded, total));
    let path = model_resolver::resolve(
        name,
        config.models_dir.as_deref(),
        config.model_base_url.as_deref(),
        Some(progress),
    )?;
    log::debug!("Using {}", path.display());
    Ok(path)
}

fn read_requests(path: &Path) -> Result<Vec<VerificationRequest>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read request file {}: {e}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| -> Result<VerificationRequest, Box<dyn std::error::Error>> {
            let request = serde_json::from_str(line)
                .map_err(|e| format!("{}:{}: invalid request: {e}", path.display(), i + 1))?;
            Ok(request)
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
