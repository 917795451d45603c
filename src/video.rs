// src/video.rs - Frame sources: webcam via nokhwa, or a blank canvas for simulation
use crate::landmarks::FrameDimensions;
use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, GenericImageView, Rgba, RgbImage, RgbaImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;
use tracing::{debug, info};

pub enum VideoSource {
    Camera(Box<Camera>),
    Blank(RgbaImage),
}

#[derive(Debug, Clone)]
pub struct CameraEntry {
    pub index: String,
    pub name: String,
    pub description: String,
}

pub fn list_cameras() -> Result<Vec<CameraEntry>> {
    let cameras =
        nokhwa::query(ApiBackend::Auto).map_err(|e| anyhow!("Failed to query cameras: {}", e))?;

    Ok(cameras
        .iter()
        .map(|camera| CameraEntry {
            index: camera.index().to_string(),
            name: camera.human_name(),
            description: camera.description().to_string(),
        })
        .collect())
}

impl VideoSource {
    pub fn new_camera(index: u32, width: u32, height: u32, fps: u32) -> Result<Self> {
        debug!("Opening camera {} at {}x{}@{}", index, width, height, fps);

        let format = CameraFormat::new(Resolution::new(width, height), FrameFormat::MJPEG, fps);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Exact(format));

        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| anyhow!("Failed to open camera {}: {}", index, e))?;
        camera
            .open_stream()
            .map_err(|e| anyhow!("Failed to open camera stream: {}", e))?;

        let resolution = camera.resolution();
        info!(
            "Camera {} streaming at {}x{}",
            index,
            resolution.width(),
            resolution.height()
        );

        Ok(VideoSource::Camera(Box::new(camera)))
    }

    pub fn blank(width: u32, height: u32) -> Self {
        VideoSource::Blank(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
    }

    /// Next RGBA frame. Camera frames are mirrored so the preview behaves
    /// like a mirror.
    pub fn read_frame(&mut self) -> Result<DynamicImage> {
        match self {
            VideoSource::Camera(camera) => {
                if !camera.is_stream_open() {
                    camera
                        .open_stream()
                        .map_err(|e| anyhow!("Failed to reopen camera stream: {}", e))?;
                }

                let buffer = camera
                    .frame()
                    .map_err(|e| anyhow!("Failed to capture frame: {}", e))?;
                let decoded = buffer
                    .decode_image::<RgbFormat>()
                    .map_err(|e| anyhow!("Failed to decode frame: {}", e))?;

                Ok(mirror_to_rgba(decoded))
            }
            VideoSource::Blank(canvas) => Ok(DynamicImage::ImageRgba8(canvas.clone())),
        }
    }

    pub fn dimensions(&self) -> FrameDimensions {
        match self {
            VideoSource::Camera(camera) => {
                let resolution = camera.resolution();
                FrameDimensions::new(resolution.width(), resolution.height())
            }
            VideoSource::Blank(canvas) => FrameDimensions::new(canvas.width(), canvas.height()),
        }
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        if let VideoSource::Camera(camera) = self {
            match camera.stop_stream() {
                Ok(()) => info!("Camera released"),
                Err(e) => debug!("Camera stop failed: {}", e),
            }
        }
    }
}

fn mirror_to_rgba(frame: RgbImage) -> DynamicImage {
    let rgba = DynamicImage::ImageRgb8(frame).to_rgba8();
    DynamicImage::ImageRgba8(image::imageops::flip_horizontal(&rgba))
}

/// Opens a camera and pulls a single frame, for diagnostics.
pub fn check_camera(index: u32, width: u32, height: u32, fps: u32) -> Result<FrameDimensions> {
    let mut source = VideoSource::new_camera(index, width, height, fps)
        .with_context(|| format!("Camera {} unavailable", index))?;
    let frame = source.read_frame().context("Camera opened but no frame arrived")?;
    let (width, height) = frame.dimensions();
    Ok(FrameDimensions::new(width, height))
}
