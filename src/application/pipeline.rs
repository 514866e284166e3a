// SPDX-License-Identifier: MPL-2.0
//! Asynchronous upload pipeline: decode files, cut out objects, place them.
//!
//! Every file of a request runs as its own blocking task, so results arrive
//! in completion order rather than request order. Requests are independent:
//! starting a new one while another is in flight runs both side by side,
//! and each [`Upload`] carries its own cancellation token. [`place_all`]
//! drains several uploads together so placement follows completion order
//! across requests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::port::{BackgroundRemover, RemovalError, RemovalProgress};
use crate::app::{Effect, Message, Session};
use crate::domain::collage::{ItemId, KindTag};
use crate::domain::media::RawImage;
use crate::error::Error;
use crate::media::background_removal::CancellationToken;
use crate::media::loader;

/// How uploaded files become canvas items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// Placed as-is inside a frame.
    Photo,
    /// Background removed, then placed without a frame.
    Object,
}

impl UploadKind {
    #[must_use]
    pub fn tag(self) -> KindTag {
        match self {
            UploadKind::Photo => KindTag::Photo,
            UploadKind::Object => KindTag::Object,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub paths: Vec<PathBuf>,
    pub kind: UploadKind,
}

impl UploadRequest {
    pub fn photos(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            kind: UploadKind::Photo,
        }
    }

    pub fn objects(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            kind: UploadKind::Object,
        }
    }
}

/// One step of an upload, in the order it happened.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    Progress {
        path: PathBuf,
        progress: RemovalProgress,
    },
    Loaded {
        path: PathBuf,
        image: RawImage,
        kind: KindTag,
    },
    /// `path` is `None` only when the worker task itself died.
    Failed {
        path: Option<PathBuf>,
        error: Error,
    },
}

/// Outcome of draining an upload into a session.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub placed: Vec<ItemId>,
    pub failed: Vec<(Option<PathBuf>, Error)>,
}

/// Starts uploads; cheap to clone and share.
#[derive(Clone, Default)]
pub struct UploadPipeline {
    remover: Option<Arc<dyn BackgroundRemover>>,
}

impl UploadPipeline {
    /// Pipeline without background removal; object uploads will fail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_remover(remover: Arc<dyn BackgroundRemover>) -> Self {
        Self {
            remover: Some(remover),
        }
    }

    /// Spawns one blocking task per file. Must be called inside a tokio
    /// runtime.
    #[must_use]
    pub fn start(&self, request: UploadRequest) -> Upload {
        let cancel: CancellationToken = Arc::new(AtomicBool::new(false));
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();

        log::info!(
            "uploading {} file(s) as {:?}",
            request.paths.len(),
            request.kind
        );

        for path in request.paths {
            let kind = request.kind;
            let cancel = Arc::clone(&cancel);
            let remover = self.remover.clone();
            let progress_tx = progress_tx.clone();

            tasks.spawn_blocking(move || {
                let result = process_file(&path, kind, remover.as_deref(), &cancel, &mut |p| {
                    // Receiver gone means nobody is listening any more.
                    let _ = progress_tx.send(UploadEvent::Progress {
                        path: path.clone(),
                        progress: p,
                    });
                });
                match result {
                    Ok(image) => UploadEvent::Loaded {
                        path,
                        image,
                        kind: kind.tag(),
                    },
                    Err(error) => UploadEvent::Failed {
                        path: Some(path),
                        error,
                    },
                }
            });
        }

        Upload {
            tasks,
            progress: progress_rx,
            cancel,
        }
    }
}

fn process_file(
    path: &std::path::Path,
    kind: UploadKind,
    remover: Option<&dyn BackgroundRemover>,
    cancel: &AtomicBool,
    progress: &mut dyn FnMut(RemovalProgress),
) -> Result<RawImage, Error> {
    let cancelled = || cancel.load(Ordering::SeqCst);

    if cancelled() {
        return Err(Error::Cancelled);
    }
    let image = loader::load_image(path)?;

    if kind == UploadKind::Photo {
        return if cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(image)
        };
    }

    let remover = remover
        .filter(|r| r.is_ready())
        .ok_or(RemovalError::ModelNotReady)?;
    if cancelled() {
        return Err(Error::Cancelled);
    }
    let cut_out = remover.remove(&image, progress)?;

    // A result that lands after cancellation is discarded.
    if cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(cut_out)
}

/// An in-flight upload.
pub struct Upload {
    tasks: JoinSet<UploadEvent>,
    progress: mpsc::UnboundedReceiver<UploadEvent>,
    cancel: CancellationToken,
}

impl Upload {
    /// Next event in completion order, or `None` once every file is done.
    ///
    /// Progress that was already reported is delivered before results.
    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        loop {
            tokio::select! {
                biased;

                Some(event) = self.progress.recv() => return Some(event),

                joined = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    match joined {
                        Some(Ok(event)) => return Some(event),
                        Some(Err(e)) => {
                            return Some(UploadEvent::Failed {
                                path: None,
                                error: Error::Io(format!("upload task failed: {e}")),
                            });
                        }
                        None => continue,
                    }
                }

                else => return None,
            }
        }
    }

    /// Stops files that have not finished yet. Already delivered results
    /// are unaffected.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Files still being processed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Drains the upload, placing each loaded image as soon as it arrives.
    pub async fn place_into(self, session: &mut Session) -> UploadReport {
        place_all([self], session).await
    }
}

/// Drains several uploads at once, placing loaded images in the order they
/// finish across all of them.
pub async fn place_all(
    uploads: impl IntoIterator<Item = Upload>,
    session: &mut Session,
) -> UploadReport {
    let mut uploads: Vec<Upload> = uploads.into_iter().collect();
    let mut report = UploadReport::default();

    while !uploads.is_empty() {
        // `next_event` is cancel safe, so the losing futures can be dropped.
        let (event, index) = {
            let pending = uploads.iter_mut().map(|upload| Box::pin(upload.next_event()));
            let (event, index, _) = future::select_all(pending).await;
            (event, index)
        };

        match event {
            Some(event) => record(event, session, &mut report),
            None => {
                uploads.swap_remove(index);
            }
        }
    }

    report
}

fn record(event: UploadEvent, session: &mut Session, report: &mut UploadReport) {
    match event {
        UploadEvent::Progress { path, progress } => {
            log::debug!("{}: {progress}", path.display());
        }
        UploadEvent::Loaded { path, image, kind } => {
            if let Effect::Placed(id) = session.update(Message::ImageLoaded { image, kind }) {
                log::debug!("{} placed as {id:?}", path.display());
                report.placed.push(id);
            }
        }
        UploadEvent::Failed { path, error } => {
            match &path {
                Some(path) => log::warn!("{}: {error}", path.display()),
                None => log::warn!("{error}"),
            }
            report.failed.push((path, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::{RemovalStage, RemoverCapabilities};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Clears alpha on the left half and optionally takes its time.
    struct HalfRemover {
        ready: bool,
        delay: Duration,
    }

    impl BackgroundRemover for HalfRemover {
        fn remove(
            &self,
            image: &RawImage,
            progress: &mut dyn FnMut(RemovalProgress),
        ) -> Result<RawImage, RemovalError> {
            progress(RemovalProgress::new(RemovalStage::Inference, 0, 1));
            std::thread::sleep(self.delay);

            let width = image.width() as usize;
            let mut bytes = image.rgba_bytes().to_vec();
            for (i, pixel) in bytes.chunks_exact_mut(4).enumerate() {
                if i % width < width / 2 {
                    pixel[3] = 0;
                }
            }
            progress(RemovalProgress::new(RemovalStage::Inference, 1, 1));
            RawImage::from_rgba(image.width(), image.height(), bytes)
                .ok_or_else(|| RemovalError::InferenceFailed("bad buffer".into()))
        }

        fn is_ready(&self) -> bool {
            self.ready
        }

        fn capabilities(&self) -> RemoverCapabilities {
            RemoverCapabilities::new("Half", 8)
        }
    }

    fn remover(ready: bool, delay: Duration) -> Arc<dyn BackgroundRemover> {
        Arc::new(HalfRemover { ready, delay })
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image_rs::RgbaImage::from_pixel(width, height, image_rs::Rgba([90, 60, 30, 255]))
            .save(&path)
            .expect("failed to write fixture");
        path
    }

    #[tokio::test]
    async fn photos_are_placed_and_failures_reported() {
        let dir = TempDir::new().unwrap();
        let a = write_png(dir.path(), "a.png", 40, 20);
        let b = write_png(dir.path(), "b.png", 10, 10);
        let missing = dir.path().join("missing.png");

        let mut session = Session::default();
        let upload = UploadPipeline::new().start(UploadRequest::photos([a, b, missing.clone()]));
        let report = upload.place_into(&mut session).await;

        assert_eq!(report.placed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0.as_deref(), Some(missing.as_path()));
        assert!(matches!(report.failed[0].1, Error::Io(_)));
        assert_eq!(session.scene().items_of_kind(KindTag::Photo).count(), 2);
    }

    #[tokio::test]
    async fn objects_have_their_background_removed() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "cat.png", 8, 2);

        let pipeline = UploadPipeline::with_remover(remover(true, Duration::ZERO));
        let mut upload = pipeline.start(UploadRequest::objects([path]));

        let mut progress_events = 0;
        let mut loaded = None;
        while let Some(event) = upload.next_event().await {
            match event {
                UploadEvent::Progress { .. } => progress_events += 1,
                UploadEvent::Loaded { image, kind, .. } => {
                    assert_eq!(kind, KindTag::Object);
                    loaded = Some(image);
                }
                UploadEvent::Failed { error, .. } => panic!("unexpected failure: {error}"),
            }
        }

        assert_eq!(progress_events, 2);
        assert_eq!(upload.pending(), 0);
        let image = loaded.expect("object was not loaded");
        assert_eq!(image.rgba_bytes()[3], 0);
        assert_eq!(image.rgba_bytes()[7 * 4 + 3], 255);
    }

    #[tokio::test]
    async fn objects_fail_without_ready_remover() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "dog.png", 4, 4);

        for pipeline in [
            UploadPipeline::new(),
            UploadPipeline::with_remover(remover(false, Duration::ZERO)),
        ] {
            let mut session = Session::default();
            let report = pipeline
                .start(UploadRequest::objects([path.clone()]))
                .place_into(&mut session)
                .await;

            assert!(report.placed.is_empty());
            assert!(matches!(
                report.failed[0].1,
                Error::BackgroundRemoval(RemovalError::ModelNotReady)
            ));
            assert!(session.scene().is_empty());
        }
    }

    #[tokio::test]
    async fn cancelled_upload_discards_pending_results() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "slow.png", 4, 4);

        let pipeline = UploadPipeline::with_remover(remover(true, Duration::from_millis(200)));
        let upload = pipeline.start(UploadRequest::objects([path]));
        upload.cancel();
        assert!(upload.is_cancelled());

        let mut session = Session::default();
        let report = upload.place_into(&mut session).await;

        assert!(report.placed.is_empty());
        assert!(matches!(report.failed[0].1, Error::Cancelled));
    }

    #[tokio::test]
    async fn concurrent_uploads_are_placed_in_completion_order() {
        let dir = TempDir::new().unwrap();
        let photo = write_png(dir.path(), "photo.png", 20, 10);
        let object = write_png(dir.path(), "object.png", 10, 20);

        // The object request starts first but its cut-out takes longer.
        let pipeline = UploadPipeline::with_remover(remover(true, Duration::from_millis(300)));
        let objects = pipeline.start(UploadRequest::objects([object]));
        let photos = pipeline.start(UploadRequest::photos([photo]));
        assert!(!photos.is_cancelled());

        let mut session = Session::default();
        let report = place_all([objects, photos], &mut session).await;

        assert_eq!(report.placed.len(), 2);
        assert!(report.failed.is_empty());
        let kinds: Vec<KindTag> = session
            .scene()
            .items()
            .iter()
            .map(|item| item.kind().tag())
            .collect();
        assert_eq!(kinds, [KindTag::Photo, KindTag::Object]);
    }

    #[tokio::test]
    async fn cancelling_one_upload_leaves_the_other() {
        let dir = TempDir::new().unwrap();
        let photo = write_png(dir.path(), "photo.png", 20, 10);
        let object = write_png(dir.path(), "object.png", 10, 20);

        let pipeline = UploadPipeline::with_remover(remover(true, Duration::from_millis(200)));
        let objects = pipeline.start(UploadRequest::objects([object]));
        let photos = pipeline.start(UploadRequest::photos([photo]));
        objects.cancel();

        let mut session = Session::default();
        let report = place_all([objects, photos], &mut session).await;

        assert_eq!(report.placed.len(), 1);
        assert!(matches!(report.failed[0].1, Error::Cancelled));
        assert_eq!(session.scene().items_of_kind(KindTag::Photo).count(), 1);
    }
}
