use eframe::egui;
use std::sync::mpsc;
use vehicle_detector::api::{DetectionClient, DetectionOutcome, ImagePayload};
use vehicle_detector::settings::Settings;
use vehicle_detector::{DetectionError, Result};

/// A detection request running on the tokio runtime.
///
/// There is no cancellation: the request runs to completion (or to the
/// client's timeout) and its result is picked up by [`DetectionTask::poll`].
pub struct DetectionTask {
    result_rx: mpsc::Receiver<Result<DetectionOutcome>>,
    payload: ImagePayload,
}

impl DetectionTask {
    pub fn spawn(
        runtime: &tokio::runtime::Runtime,
        ctx: egui::Context,
        settings: Settings,
        payload: ImagePayload,
    ) -> Self {
        let (tx, result_rx) = mpsc::channel();
        let image = payload.clone();

        runtime.spawn(async move {
            let result = match DetectionClient::new(settings) {
                Ok(client) => client.detect(&image).await,
                Err(err) => Err(err),
            };
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        Self { result_rx, payload }
    }

    /// The image that was submitted.
    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }

    /// Returns the outcome once the request has finished.
    pub fn poll(&self) -> Option<Result<DetectionOutcome>> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(DetectionError::Task(
                "detection task ended without a result".to_owned(),
            ))),
        }
    }
}
