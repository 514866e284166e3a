// SPDX-License-Identifier: MPL-2.0
//! Command-line front end: load images, arrange them, export the collage.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use collage_lens::app::config::{self, Config};
use collage_lens::app::{apply_flags, paths, Effect, Flags, Message, Session};
use collage_lens::application::pipeline::{place_all, UploadPipeline, UploadReport, UploadRequest};
use collage_lens::application::port::{FilePicker, RemovalError, RemovalProgress};
use collage_lens::error::{Error, Result};
use collage_lens::infrastructure::{OnnxBackgroundRemover, RfdFilePicker};
use collage_lens::media::background_removal::{
    self, BackgroundRemovalManager, ModelError,
};
use collage_lens::media::export::default_filename;
use collage_lens::media::ExportFormat;

const HELP: &str = "\
collage-lens: arrange photos and cut-out objects into a collage

USAGE:
  collage-lens [OPTIONS] [PHOTO...]

OPTIONS:
  --object PATH        Add an image with its background removed (repeatable)
  --pick               Choose more photos in a file dialog
  --resolution NAME    hd, fullhd, qhd, 4k, square, portrait or WIDTHxHEIGHT
  --zoom PERCENT       Workspace zoom (10-800)
  --background #HEX    Canvas colour
  --frame-color #HEX   Photo frame colour
  --frame-width N      Photo frame width in canvas units
  --no-shadow          Draw photos without a drop shadow
  --format FORMAT      png or jpeg (default: from -o, then settings)
  --quality N          JPEG quality (1-100)
  -o, --output PATH    Output file (default: collage_<timestamp>.<ext>)
  --download-model     Fetch the background removal model first
  --data-dir PATH      Override the data directory
  --config-dir PATH    Override the config directory
  -h, --help           Print this help

ENVIRONMENT:
  COLLAGE_LENS_DATA_DIR, COLLAGE_LENS_CONFIG_DIR, RUST_LOG
";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let flags = match Flags::parse(std::env::args_os().skip(1).collect()) {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    paths::init_cli_overrides(flags.data_dir.clone(), flags.config_dir.clone());

    let (mut config, warning) = config::load();
    if let Some(warning) = warning {
        log::warn!("{warning}");
    }
    apply_flags(&mut config, &flags);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(flags, config)) {
        Ok(Some(path)) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the whole pipeline. Returns the written file, if any.
async fn run(flags: Flags, config: Config) -> Result<Option<PathBuf>> {
    let model_path = background_removal::get_model_path();

    if flags.download_model {
        ensure_model(&config, &model_path).await?;
    }

    let mut photos = flags.photos.clone();
    if flags.pick {
        let picked = RfdFilePicker::new().pick_images("Add photos").await;
        log::info!("picked {} file(s)", picked.len());
        photos.extend(picked);
    }

    if photos.is_empty() && flags.objects.is_empty() {
        if flags.download_model {
            return Ok(None);
        }
        return Err(Error::Config(
            "no images given; pass photo paths, --object or --pick".to_string(),
        ));
    }

    let pipeline = if flags.objects.is_empty() {
        UploadPipeline::new()
    } else {
        UploadPipeline::with_remover(load_remover(model_path).await)
    };

    // Both requests run side by side and are placed as files finish.
    let uploads = [
        pipeline.start(UploadRequest::photos(photos)),
        pipeline.start(UploadRequest::objects(flags.objects.clone())),
    ];

    let mut session = Session::from_config(&config);
    let report = place_all(uploads, &mut session).await;
    summarize(&report);

    if session.scene().is_empty() {
        return Err(Error::Decode("none of the images could be placed".to_string()));
    }

    session.update(Message::Arrange);

    let format = flags
        .format
        .or_else(|| flags.output.as_deref().and_then(ExportFormat::from_path))
        .unwrap_or(config.export.format);

    let exported = match session.update(Message::Export(format)) {
        Effect::Exported(exported) => exported,
        Effect::Failed(e) => return Err(e),
        other => return Err(Error::Export(format!("unexpected export result: {other:?}"))),
    };

    let path = flags.output.clone().unwrap_or_else(|| {
        config
            .export
            .output_dir
            .clone()
            .unwrap_or_default()
            .join(default_filename(format))
    });
    exported.save_to_file(&path)?;
    Ok(Some(path))
}

/// Downloads (if missing), verifies and test-runs the model.
async fn ensure_model(config: &Config, model_path: &Path) -> Result<()> {
    if background_removal::is_model_file_complete(model_path) {
        log::info!("model already present at {}", model_path.display());
    } else {
        let mut last_logged = 0;
        background_removal::download_model(
            &config.background_removal.model_url,
            model_path,
            None,
            move |progress: RemovalProgress| {
                let percent = progress.percent();
                if percent >= last_logged + 10 {
                    last_logged = percent;
                    log::info!("{progress}");
                }
            },
        )
        .await
        .map_err(model_error)?;
    }

    if let Some(expected) = &config.background_removal.model_checksum {
        background_removal::verify_checksum(model_path, expected).map_err(model_error)?;
        log::info!("model checksum verified");
    }

    let model_path = model_path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut manager = BackgroundRemovalManager::new(model_path);
        manager.load_session(None)?;
        background_removal::validate_model(&mut manager, None)
    })
    .await
    .map_err(|e| Error::Io(e.to_string()))?
    .map_err(model_error)?;

    log::info!("model validated");
    Ok(())
}

/// Loads the ONNX session off the async threads. A remover that fails to
/// load is still returned; its uploads then fail individually.
async fn load_remover(model_path: PathBuf) -> Arc<OnnxBackgroundRemover> {
    let loaded = tokio::task::spawn_blocking(move || {
        let remover = OnnxBackgroundRemover::with_model_path(model_path);
        if let Err(e) = remover.load() {
            log::warn!("{e}; run with --download-model to fetch it");
        }
        remover
    })
    .await;

    match loaded {
        Ok(remover) => Arc::new(remover),
        Err(e) => {
            log::warn!("model loading task failed: {e}");
            Arc::new(OnnxBackgroundRemover::new())
        }
    }
}

fn model_error(err: ModelError) -> Error {
    Error::from(RemovalError::from(err))
}

fn summarize(report: &UploadReport) {
    let (placed, failed) = (report.placed.len(), report.failed.len());
    if failed > 0 {
        log::warn!("placed {placed} image(s), {failed} failed");
    } else {
        log::info!("placed {placed} image(s)");
    }
}
