// src/app.rs
use crate::ui::{self, Theme, VideoWidget};
use gesture_control::detector::{HandDetector, PointerHand};
use gesture_control::dispatch::{KeyDispatcher, LogDispatcher};
use gesture_control::gate::{GateState, GateStatus};
use gesture_control::landmarks::FrameDimensions;
use gesture_control::trace::TraceRecorder;
use gesture_control::video::VideoSource;
use gesture_control::{ClassificationPolicy, EngineConfig, FrameReport, GestureEngine};

use eframe::egui;
use image::GenericImageView;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct GestureControlApp {
    video_source: VideoSource,
    detector: PointerHand,
    config: EngineConfig,
    // Handed to the engine once the first frame fixes the dimensions
    dispatcher: Option<Box<dyn KeyDispatcher>>,
    engine: Option<GestureEngine<Box<dyn KeyDispatcher>>>,
    started: Instant,
    last_report: Option<FrameReport>,
    video_rect: Option<egui::Rect>,
    video_widget: VideoWidget,
    theme: Theme,
    recording: Option<TraceRecorder>,
    dropped_frames: u64,
}

impl GestureControlApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        video_source: VideoSource,
        config: EngineConfig,
        dispatcher: Box<dyn KeyDispatcher>,
        recording: Option<TraceRecorder>,
    ) -> Self {
        cc.egui_ctx.set_visuals(ui::create_visuals());

        Self {
            video_source,
            detector: PointerHand::new(),
            config,
            dispatcher: Some(dispatcher),
            engine: None,
            started: Instant::now(),
            last_report: None,
            video_rect: None,
            video_widget: VideoWidget::new(),
            theme: Theme::default(),
            recording,
            dropped_frames: 0,
        }
    }

    /// One pipeline iteration. Frame errors skip the iteration; the next
    /// repaint tries again.
    fn process_frame(&mut self, ctx: &egui::Context) {
        let frame = match self.video_source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                self.dropped_frames += 1;
                debug!("Frame skipped: {:#}", e);
                return;
            }
        };
        let now = self.started.elapsed();

        let pointer = ctx.input(|i| i.pointer.hover_pos());
        let normalized = match (self.video_rect, pointer) {
            (Some(rect), Some(pos)) => ui::screen_to_normalized(rect, pos),
            _ => None,
        };
        self.detector.set_pointer(normalized);

        let landmarks = match self.detector.detect(&frame) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                warn!("{} detector failed: {:#}", self.detector.name(), e);
                None
            }
        };

        let (width, height) = frame.dimensions();
        let dims = FrameDimensions::new(width, height);
        let config = &self.config;
        let dispatcher = &mut self.dispatcher;
        let engine = self.engine.get_or_insert_with(|| {
            let dispatcher = dispatcher
                .take()
                .unwrap_or_else(|| Box::new(LogDispatcher::new()) as Box<dyn KeyDispatcher>);
            GestureEngine::new(config.clone(), dims, dispatcher)
        });

        let report = engine.process_frame(landmarks.as_ref(), now);
        if let Some(recorder) = &mut self.recording {
            if let Err(e) = recorder.add_frame(now, landmarks.as_ref()) {
                warn!("Recording stopped: {:#}", e);
                self.recording = None;
            }
        }

        self.video_widget.update_frame(ctx, &frame);
        self.last_report = Some(report);
    }

    fn render_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("Gesture Control");
                ui.separator();
                ui.label(match self.config.policy {
                    ClassificationPolicy::Zone => "Zone grid",
                    ClassificationPolicy::Motion => "Fingertip motion",
                });
                if let Some(engine) = &self.engine {
                    ui.separator();
                    ui.label(format!("Keys: {}", engine.dispatcher().name()));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label("Q / Esc to quit");
                    if self.recording.is_some() {
                        ui.colored_label(egui::Color32::from_rgb(244, 67, 54), "● REC");
                    }
                });
            });
            ui.add_space(6.0);
        });
    }

    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let status = match self.last_report.as_ref().map(|r| r.gate) {
                    Some(GateStatus::Activation { state, settling, .. }) => match state {
                        GateState::Inactive => "Waiting for hand in centre".to_string(),
                        GateState::Arming => "Arming".to_string(),
                        GateState::Active if settling => "Active (settling)".to_string(),
                        GateState::Active => "Active".to_string(),
                    },
                    Some(GateStatus::Cooldown { ready: true }) => "Ready".to_string(),
                    Some(GateStatus::Cooldown { ready: false }) => "Cooling down".to_string(),
                    None => "Waiting for video".to_string(),
                };
                ui.label(status);

                if let Some(engine) = &self.engine {
                    ui.separator();
                    ui.label(format!("Frames: {}", engine.frames_processed()));
                }
                if self.dropped_frames > 0 {
                    ui.separator();
                    ui.label(format!("Dropped: {}", self.dropped_frames));
                }
            });
        });
    }

    fn render_video(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                let (rect, _response) = self.video_widget.show(ui);
                self.video_rect = Some(rect);

                let painter = ui.painter_at(rect);
                if let (Some(report), Some(engine)) = (&self.last_report, &self.engine) {
                    paint_overlay(&painter, rect, &self.theme, engine.dimensions(), report);
                }
            });
        });
    }
}

fn paint_overlay(
    painter: &egui::Painter,
    rect: egui::Rect,
    theme: &Theme,
    dims: FrameDimensions,
    report: &FrameReport,
) {
    let marker = report.point.map(|p| ui::frame_to_screen(rect, dims, &p));

    match report.gate {
        GateStatus::Activation {
            state,
            centre_occupied,
            countdown,
            ..
        } if state != GateState::Active => {
            ui::draw_start_screen(painter, rect, theme, centre_occupied, countdown);
            if let Some(pos) = marker {
                ui::draw_marker(painter, pos, theme);
            }
        }
        GateStatus::Activation { .. } => {
            ui::draw_zone_grid(painter, rect, theme, report.candidate);
            if let Some(pos) = marker {
                ui::draw_marker(painter, pos, theme);
            }
            ui::draw_action_label(painter, rect, theme, report.current_action);
        }
        GateStatus::Cooldown { .. } => {
            if let Some(pos) = marker {
                ui::draw_marker(painter, pos, theme);
            }
            ui::draw_action_label(painter, rect, theme, report.current_action);
        }
    }
}

impl eframe::App for GestureControlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_frame(ctx);

        self.render_header(ctx);
        self.render_status_bar(ctx);
        self.render_video(ctx);

        if ctx.input(|i| i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape)) {
            info!("Quit requested");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        ctx.request_repaint();
    }
}

impl Drop for GestureControlApp {
    fn drop(&mut self) {
        if let Some(recorder) = self.recording.take() {
            if let Err(e) = recorder.finish() {
                warn!("Failed to save trace: {:#}", e);
            }
        }
    }
}
