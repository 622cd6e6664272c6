//! Main metadata generator window.
//!
//! This module contains the `MetadataApp` struct which implements the
//! `eframe::App` trait: an upload column on the left and the generated
//! metadata on the right.

use super::rendering::{
    ACCENT, DANGER, MUTED, card_frame, copy_button, description_counter, draw_drop_zone,
    decode_preview, keyword_chips, metadata_field, upload_hint,
};
use super::settings::{AVAILABLE_MODELS, Settings};
use super::state::{CopyFeedback, GenerationOutcome, PreviewReady};
use crate::clipboard;
use crate::config::{Config, Overrides};
use crate::error::{AppError, Result};
use crate::gemini::{GeminiClient, MetadataService};
use crate::image_loader::{EncodedImage, ImageLoader, SUPPORTED_EXTENSIONS};
use crate::metadata::{CopyTarget, GeneratedMetadata};
use crate::session::{GenerationTicket, RequestStatus, Session};
use eframe::egui;
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::{Duration, Instant};

/// The stock metadata generator application.
pub struct MetadataApp {
    session: Session,

    // Preview state
    preview_texture: Option<egui::TextureHandle>,
    /// Decoded preview waiting for upload on the next frame
    pending_preview: Option<egui::ColorImage>,
    preview_error: Option<String>,
    /// Bumped on every pick so late previews of replaced images are dropped
    pick_id: u64,
    preview_rx: Receiver<PreviewReady>,
    preview_tx: Sender<PreviewReady>,

    // Request plumbing
    ctx: egui::Context,
    config: Config,
    rx: Receiver<GenerationOutcome>,
    tx: Sender<GenerationOutcome>,

    // Transient UI state
    copy_feedback: CopyFeedback,
    notice: Option<String>,

    // Settings
    settings: Settings,
    show_settings: bool,
}

impl MetadataApp {
    /// Creates the app, optionally preloaded with an image.
    ///
    /// `overrides` take precedence over the saved settings for this run only.
    pub fn new(
        ctx: egui::Context,
        config: Config,
        overrides: Overrides,
        initial_image: Option<EncodedImage>,
    ) -> Self {
        let (tx, rx) = channel();
        let (preview_tx, preview_rx) = channel();
        let settings = Settings::load(&config).with_overrides(overrides);

        let mut app = Self {
            session: Session::new(),
            preview_texture: None,
            pending_preview: None,
            preview_error: None,
            pick_id: 0,
            preview_rx,
            preview_tx,
            ctx,
            config,
            rx,
            tx,
            copy_feedback: CopyFeedback::default(),
            notice: None,
            settings,
            show_settings: false,
        };

        if let Some(image) = initial_image {
            app.select_image(image);
        }
        app
    }

    fn loader(&self) -> ImageLoader {
        ImageLoader::new(self.settings.upload_policy(&self.config))
    }

    /// Replaces the current image and starts decoding its preview.
    fn select_image(&mut self, image: EncodedImage) {
        self.clear_preview();
        self.spawn_preview(image.clone());

        self.notice = None;
        self.session.select_image(image);
    }

    /// Decodes the preview on a background thread.
    fn spawn_preview(&self, image: EncodedImage) {
        let pick_id = self.pick_id;
        let tx = self.preview_tx.clone();
        let ctx = self.ctx.clone();

        thread::spawn(move || {
            let _ = tx.send(PreviewReady {
                pick_id,
                preview: decode_preview(&image),
            });
            ctx.request_repaint();
        });
    }

    /// Takes finished previews, ignoring those for images already replaced.
    fn process_previews(&mut self) {
        while let Ok(PreviewReady { pick_id, preview }) = self.preview_rx.try_recv() {
            if pick_id != self.pick_id {
                continue;
            }
            match preview {
                Ok(color_image) => self.pending_preview = Some(color_image),
                Err(e) => {
                    tracing::warn!(error = %e, "preview unavailable");
                    self.preview_error = Some("Preview unavailable for this file".to_string());
                }
            }
        }
    }

    fn clear_preview(&mut self) {
        self.pick_id += 1;
        self.preview_texture = None;
        self.pending_preview = None;
        self.preview_error = None;
        self.copy_feedback.clear();
    }

    fn remove_image(&mut self) {
        self.clear_preview();
        self.session.remove_image();
    }

    /// "Reset & Upload New": back to the empty window.
    fn reset(&mut self) {
        self.clear_preview();
        self.notice = None;
        self.session.reset();
    }

    /// Loads a file chosen by the user. Failures leave the session untouched.
    fn load_path(&mut self, path: &Path) {
        match self.loader().load_path(path) {
            Ok(image) => self.select_image(image),
            Err(e) => self.report_load_failure(e),
        }
    }

    fn load_bytes(&mut self, bytes: &[u8], name: Option<String>) {
        match self.loader().load_bytes(bytes, name) {
            Ok(image) => self.select_image(image),
            Err(e) => self.report_load_failure(e),
        }
    }

    fn report_load_failure(&mut self, error: AppError) {
        tracing::warn!(error = %error, "could not load image");
        self.notice = Some(error.to_string());
    }

    fn pick_file(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Choose a photo")
            .add_filter("Images", SUPPORTED_EXTENSIONS)
            .pick_file();

        if let Some(path) = picked {
            self.load_path(&path);
        }
    }

    /// Takes the first file dropped onto the window, if any.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        let Some(file) = dropped else {
            return;
        };

        if let Some(path) = &file.path {
            self.load_path(path);
        } else if let Some(bytes) = &file.bytes {
            let name = (!file.name.is_empty()).then(|| file.name.clone());
            self.load_bytes(bytes, name);
        }
    }

    fn generate(&mut self, ctx: &egui::Context) {
        if let Some(ticket) = self.session.begin_generation() {
            self.spawn_request(ctx, ticket);
        }
    }

    fn retry(&mut self, ctx: &egui::Context) {
        if let Some(ticket) = self.session.retry() {
            self.spawn_request(ctx, ticket);
        }
    }

    /// Runs the Gemini request for `ticket` on a background thread.
    ///
    /// The outcome comes back through the channel tagged with the ticket id,
    /// so the session can drop it if the user has moved on.
    fn spawn_request(&mut self, ctx: &egui::Context, ticket: GenerationTicket) {
        // Save settings before making request
        if let Err(e) = self.settings.save() {
            tracing::warn!(error = %e, "failed to save settings");
        }

        self.copy_feedback.clear();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        let request_config = self.settings.request_config(&self.config);

        thread::spawn(move || {
            let outcome = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt.block_on(request_metadata(request_config, ticket.image())),
                Err(e) => Err(AppError::generation(format!(
                    "Failed to create async runtime: {}",
                    e
                ))),
            };

            let _ = tx.send(GenerationOutcome {
                ticket_id: ticket.id(),
                outcome,
            });
            ctx.request_repaint();
        });
    }

    /// Applies finished requests to the session.
    fn process_outcomes(&mut self) {
        while let Ok(GenerationOutcome { ticket_id, outcome }) = self.rx.try_recv() {
            self.session.complete(ticket_id, outcome);
        }
    }

    fn copy(&mut self, target: CopyTarget, metadata: &GeneratedMetadata) {
        match clipboard::copy_text(&metadata.copy_text(target)) {
            Ok(()) => self.copy_feedback.mark(target, Instant::now()),
            Err(e) => {
                tracing::warn!(error = %e, "copy failed");
                self.notice = Some(e.to_string());
            }
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("ShutterGen").size(22.0).strong());
            ui.label(egui::RichText::new("AI").size(22.0).strong().color(ACCENT));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⚙ Settings").clicked() {
                    self.show_settings = !self.show_settings;
                }
                ui.label(egui::RichText::new("Metadata Generator for Stock Contributors").color(MUTED));
            });
        });
    }

    /// Renders the settings panel.
    fn render_settings_ui(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .default_width(360.0)
            .show(ctx, |ui| {
                // Model selector
                egui::ComboBox::from_label("Model")
                    .selected_text(&self.settings.model)
                    .show_ui(ui, |ui| {
                        for model in AVAILABLE_MODELS {
                            ui.selectable_value(&mut self.settings.model, model.to_string(), *model);
                        }
                    });
                if let Some(model) = &self.settings.overrides().model {
                    ui.label(egui::RichText::new(format!("Using {} from the command line", model)).small().color(MUTED));
                }

                // API Key
                ui.label("API Key:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings.api_key)
                        .password(true)
                        .hint_text("Paste Gemini API Key"),
                );
                if !self.settings.has_api_key() && self.config.gemini_api_key.is_empty() {
                    ui.colored_label(DANGER, "No key found in GEMINI_API_KEY either.");
                }

                ui.checkbox(
                    &mut self.settings.enforce_upload_limits,
                    "Reject non-image files and files over the size limit",
                );
                if self.settings.overrides().enforce_upload_limits == Some(false) {
                    ui.label(
                        egui::RichText::new("Upload limits are off for this run (--no-upload-limits)")
                            .small()
                            .color(MUTED),
                    );
                }

                ui.separator();
                if ui.button("Save").clicked() {
                    if let Err(e) = self.settings.save() {
                        self.notice = Some(format!("Failed to save settings: {}", e));
                    }
                }
            });
        self.show_settings = open;
    }

    fn render_upload_column(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());

        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            let preview_height = ui.available_width() * 0.75;

            if self.session.has_image() {
                ui.vertical_centered(|ui| {
                    if let Some(texture) = &self.preview_texture {
                        ui.add(
                            egui::Image::new(texture)
                                .max_size(egui::vec2(ui.available_width(), preview_height))
                                .maintain_aspect_ratio(true),
                        );
                    } else if let Some(message) = &self.preview_error {
                        ui.add_space(preview_height / 2.0);
                        ui.label(egui::RichText::new(message).color(MUTED));
                        ui.add_space(preview_height / 2.0);
                    } else {
                        ui.add_space(preview_height / 2.0 - 12.0);
                        ui.add(egui::Spinner::new().size(24.0).color(ACCENT));
                        ui.add_space(preview_height / 2.0 - 12.0);
                    }

                    if let Some(name) = self.session.image().and_then(|i| i.file_name()) {
                        ui.label(egui::RichText::new(name).small().color(MUTED));
                    }
                });

                if ui
                    .add(egui::Button::new(egui::RichText::new("✕ Remove image").color(DANGER)))
                    .clicked()
                {
                    self.remove_image();
                }
            } else if draw_drop_zone(
                ui,
                preview_height,
                hovering_files,
                &upload_hint(&self.settings.upload_policy(&self.config)),
            )
            .clicked()
            {
                self.pick_file();
            }

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(8.0);

            let loading = self.session.status().is_loading();
            let label = if loading { "Generating..." } else { "Generate Metadata" };
            let button = egui::Button::new(egui::RichText::new(label).size(16.0).strong())
                .min_size(egui::vec2(ui.available_width(), 40.0));
            if ui.add_enabled(self.session.can_generate(), button).clicked() {
                self.generate(ctx);
            }
        });

        ui.add_space(16.0);

        egui::Frame::new()
            .fill(egui::Color32::from_rgb(239, 246, 255))
            .corner_radius(10.0)
            .inner_margin(egui::Margin::same(12))
            .show(ui, |ui| {
                ui.label(
                    egui::RichText::new("💡 Professional Tip")
                        .strong()
                        .color(egui::Color32::from_rgb(30, 64, 175)),
                );
                ui.label(
                    egui::RichText::new(
                        "Gemini AI will analyze visual components like color palette, composition, \
                         lighting, and subject matter to create SEO-optimized fields specifically \
                         for marketplaces like Shutterstock and Adobe Stock.",
                    )
                    .small()
                    .color(egui::Color32::from_rgb(29, 78, 216)),
                );
            });

        if let Some(notice) = self.notice.clone() {
            ui.add_space(12.0);
            ui.horizontal_wrapped(|ui| {
                ui.colored_label(DANGER, notice);
                if ui.small_button("Dismiss").clicked() {
                    self.notice = None;
                }
            });
        }
    }

    fn render_results_column(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading("Generated Metadata");
            ui.add_space(12.0);

            // Clone state data for rendering to avoid borrow issues
            let status = self.session.status().clone();
            match status {
                RequestStatus::Idle if !self.session.has_image() => render_empty_ui(ui),
                RequestStatus::Idle => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(80.0);
                        ui.label(
                            egui::RichText::new("Press \"Generate Metadata\" to analyze this photo")
                                .color(MUTED),
                        );
                    });
                }
                RequestStatus::Loading => render_loading_ui(ui),
                RequestStatus::Failed(message) => self.render_error_ui(ui, ctx, &message),
                RequestStatus::Succeeded(metadata) => self.render_result_ui(ui, &metadata),
            }
        });
    }

    /// Renders the error state with a retry action.
    fn render_error_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, message: &str) {
        ui.add_space(24.0);
        egui::Frame::new()
            .fill(egui::Color32::from_rgb(254, 242, 242))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(254, 202, 202)))
            .corner_radius(10.0)
            .inner_margin(egui::Margin::same(16))
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new(message).color(DANGER).strong());
                    ui.add_space(8.0);
                    if ui.button("Try Again").clicked() {
                        self.retry(ctx);
                    }
                });
            });
    }

    /// Renders the generated title, description and keywords.
    fn render_result_ui(&mut self, ui: &mut egui::Ui, metadata: &GeneratedMetadata) {
        let now = Instant::now();

        egui::ScrollArea::vertical().show(ui, |ui| {
            let title_copied = self.copy_feedback.is_active(CopyTarget::Title, now);
            if metadata_field(ui, "Title / Caption", &metadata.title, false, title_copied) {
                self.copy(CopyTarget::Title, metadata);
            }
            ui.add_space(16.0);

            let description_copied = self.copy_feedback.is_active(CopyTarget::Description, now);
            if metadata_field(ui, "Description", &metadata.description, true, description_copied) {
                self.copy(CopyTarget::Description, metadata);
            }
            description_counter(ui, metadata.description_len());
            ui.add_space(20.0);

            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!("KEYWORDS ({})", metadata.keywords.len()))
                        .small()
                        .strong()
                        .color(MUTED),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let copied = self.copy_feedback.is_active(CopyTarget::Keywords, now);
                    if copy_button(ui, "Copy All", copied) {
                        self.copy(CopyTarget::Keywords, metadata);
                    }
                });
            });
            ui.add_space(6.0);
            keyword_chips(ui, &metadata.keywords);

            ui.add_space(28.0);
            ui.separator();
            ui.add_space(8.0);
            let reset = egui::Button::new("Reset & Upload New").min_size(egui::vec2(ui.available_width(), 36.0));
            if ui.add(reset).clicked() {
                self.reset();
            }
        });
    }
}

async fn request_metadata(config: Result<Config>, image: &EncodedImage) -> Result<GeneratedMetadata> {
    let client = GeminiClient::new(&config?)?;
    client.generate(image).await
}

fn render_empty_ui(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(96.0);
        ui.label(egui::RichText::new("Upload an image to get started").color(MUTED).strong());
    });
}

fn render_loading_ui(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(96.0);
        ui.add(egui::Spinner::new().size(40.0).color(ACCENT));
        ui.add_space(12.0);
        ui.label(egui::RichText::new("Analyzing photo structure...").strong());
        ui.label(egui::RichText::new("Generating SEO keywords & description").small().color(MUTED));
    });
}

impl eframe::App for MetadataApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::light());

        self.process_outcomes();
        self.process_previews();
        self.handle_dropped_files(ctx);

        // Upload texture using pre-converted data
        if let Some(color_image) = self.pending_preview.take() {
            self.preview_texture = Some(ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR));
        }

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(egui::Color32::WHITE).inner_margin(egui::Margin::symmetric(20, 12)))
            .show(ctx, |ui| self.render_header(ui));

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("© 2026 ShutterGen AI. Designed for Stock Photo Contributors.")
                        .small()
                        .color(MUTED),
                );
            });
        });

        egui::SidePanel::left("upload_column")
            .resizable(false)
            .exact_width(440.0)
            .frame(egui::Frame::new().fill(egui::Color32::from_rgb(248, 250, 252)).inner_margin(egui::Margin::same(20)))
            .show(ctx, |ui| self.render_upload_column(ui, ctx));

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::from_rgb(248, 250, 252)).inner_margin(egui::Margin::same(20)))
            .show(ctx, |ui| self.render_results_column(ui, ctx));

        if self.show_settings {
            self.render_settings_ui(ctx);
        }

        // Keep "Copied!" indicators ticking until they expire
        if let Some(remaining) = self.copy_feedback.next_expiry(Instant::now()) {
            ctx.request_repaint_after(remaining + Duration::from_millis(16));
        }
    }
}

/// Launches the metadata generator window and blocks until it is closed.
///
/// # Arguments
/// * `config` - Application configuration
/// * `overrides` - Command line values layered over saved settings
/// * `initial_image` - Image to preload, e.g. from the command line
pub fn run(config: Config, overrides: Overrides, initial_image: Option<EncodedImage>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("ShutterGen AI")
            .with_inner_size([1120.0, 780.0])
            .with_min_inner_size([860.0, 600.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "ShutterGen AI",
        options,
        Box::new(move |cc| {
            let app = MetadataApp::new(cc.egui_ctx.clone(), config, overrides, initial_image);
            Ok(Box::new(app) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))
}
