//! Background loading and decoding of uploaded and result images.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread;
use thiserror::Error;
use vehicle_detector::DetectionError;
use vehicle_detector::api::ImagePayload;
use vehicle_detector::presenter::DisplaySource;

/// Errors that can occur when loading and decoding images.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error(transparent)]
    Payload(#[from] DetectionError),
    #[error("failed to decode image '{name}': {source}")]
    Decode {
        name: String,
        source: image::ImageError,
    },
    #[error("invalid annotated image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image loader stopped unexpectedly")]
    Disconnected,
}

/// Decoded image data ready for texture creation.
pub struct DecodedImage {
    pixels: RgbaImage,
    /// Size of the source file, kept when the pixels are downscaled.
    natural_size: [u32; 2],
}

impl DecodedImage {
    pub fn new(pixels: RgbaImage) -> Self {
        let natural_size = [pixels.width(), pixels.height()];
        Self {
            pixels,
            natural_size,
        }
    }

    pub fn natural_size(&self) -> [u32; 2] {
        self.natural_size
    }

    /// Pixel size of the data that will be uploaded.
    pub fn pixel_size(&self) -> [u32; 2] {
        [self.pixels.width(), self.pixels.height()]
    }

    /// Downscales the pixels so neither side exceeds `max_side`, keeping the
    /// aspect ratio and the natural size.
    pub fn fit_within(self, max_side: usize) -> Self {
        let max_side = u32::try_from(max_side).unwrap_or(u32::MAX).max(1);
        let [width, height] = self.pixel_size();
        if width <= max_side && height <= max_side {
            return self;
        }

        log::info!("Downscaling {width}x{height} image to fit texture limit {max_side}");
        let resized = DynamicImage::ImageRgba8(self.pixels)
            .resize(max_side, max_side, FilterType::Triangle)
            .into_rgba8();

        Self {
            pixels: resized,
            natural_size: self.natural_size,
        }
    }

    pub fn into_texture(self, ctx: &egui::Context, name: &str) -> TextureHandle {
        let max_side = ctx.input(|i| i.max_texture_side);
        let fitted = self.fit_within(max_side);
        let [width, height] = fitted.pixel_size();
        let image = ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            fitted.pixels.as_raw(),
        );
        ctx.load_texture(name, image, TextureOptions::LINEAR)
    }
}

/// The image decoded for the results view.
pub struct ResultFrame {
    pub image: DecodedImage,
    /// `false` when the original upload is shown instead of the annotation.
    pub annotated: bool,
}

/// A selected upload together with its decoded preview.
pub struct LoadedUpload {
    pub payload: ImagePayload,
    pub preview: DecodedImage,
}

/// Where an upload comes from.
pub enum UploadSource {
    Path(PathBuf),
    Bytes { name: String, bytes: Arc<[u8]> },
}

pub type Pending<T> = mpsc::Receiver<Result<T, ImageLoadError>>;

/// Non-blocking check of a pending load. `None` while still running.
pub fn poll<T>(rx: &Pending<T>) -> Option<Result<T, ImageLoadError>> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(mpsc::TryRecvError::Empty) => None,
        Err(mpsc::TryRecvError::Disconnected) => Some(Err(ImageLoadError::Disconnected)),
    }
}

pub fn decode(name: &str, bytes: &[u8]) -> Result<DecodedImage, ImageLoadError> {
    let img = image::load_from_memory(bytes).map_err(|source| ImageLoadError::Decode {
        name: name.to_owned(),
        source,
    })?;
    Ok(DecodedImage::new(img.into_rgba8()))
}

/// Reads, validates and decodes an upload in a background thread.
pub fn spawn_upload(ctx: &egui::Context, source: UploadSource) -> Pending<LoadedUpload> {
    spawn(ctx, move || {
        let payload = match source {
            UploadSource::Path(path) => ImagePayload::from_path(&path)?,
            UploadSource::Bytes { name, bytes } => ImagePayload::from_bytes(name, bytes)?,
        };
        let preview = decode(&payload.name, &payload.bytes)?;
        Ok(LoadedUpload { payload, preview })
    })
}

/// Decodes the image the results view should show. A broken annotated image
/// falls back to the original upload.
pub fn spawn_result(
    ctx: &egui::Context,
    display: DisplaySource,
    original: ImagePayload,
) -> Pending<ResultFrame> {
    spawn(ctx, move || {
        if let DisplaySource::Annotated(encoded) = display {
            match decode_annotated(&encoded) {
                Ok(image) => {
                    return Ok(ResultFrame {
                        image,
                        annotated: true,
                    });
                }
                Err(err) => log::warn!("Annotated image unusable, showing original: {err}"),
            }
        }
        Ok(ResultFrame {
            image: decode(&original.name, &original.bytes)?,
            annotated: false,
        })
    })
}

fn decode_annotated(encoded: &str) -> Result<DecodedImage, ImageLoadError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    decode("annotated result", &bytes)
}

fn spawn<T, F>(ctx: &egui::Context, job: F) -> Pending<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ImageLoadError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let ctx = ctx.clone();

    thread::spawn(move || {
        let result = job();
        let _ = tx.send(result);
        ctx.request_repaint();
    });

    rx
}
