#![allow(clippy::suspicious_op_assign_impl)]

use std::{
    ops::AddAssign,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use eframe::NativeOptions;
use egui::{
    load::SizedTexture, mutex::RwLock, ColorImage, ImageSource, Response, Slider, ViewportBuilder,
};
use fisheye_rotation::{
    effect::INFO, Controls, Filter, FisheyeRotation, ParameterId, RenderConfig,
};
use image::RgbaImage;

/// Size of the surface the viewer renders into.
const SURFACE_SIZE: [u32; 2] = [600, 600];

/// Records whether any widget reported a change this frame.
struct Listener {
    changed: bool,
}

impl Listener {
    fn new() -> Self {
        Self { changed: false }
    }

    fn changed(&self) -> bool {
        self.changed
    }
}

impl AddAssign<bool> for Listener {
    fn add_assign(&mut self, rhs: bool) {
        self.changed |= rhs;
    }
}

impl AddAssign<Response> for Listener {
    fn add_assign(&mut self, rhs: Response) {
        self.changed |= rhs.changed();
    }
}

fn show_error(description: String) {
    log::error!("{description}");
    rfd::MessageDialog::new()
        .set_title("Error")
        .set_description(description)
        .show();
}

pub fn run(effect: FisheyeRotation, initial: Option<RgbaImage>) -> eframe::Result<()> {
    let mut image = initial.map(Arc::new);
    let mut controls = effect.snapshot();
    let mut filter = Filter::default();
    // Set on every change; cleared when a render is dispatched.
    let mut dirty = image.is_some();

    let out_image: Arc<RwLock<Option<RgbaImage>>> = Arc::new(RwLock::new(None));
    let out_tex: Arc<RwLock<Option<SizedTexture>>> = Arc::new(RwLock::new(None));
    let processing = Arc::new(AtomicBool::new(false));

    let options = NativeOptions {
        viewport: ViewportBuilder::default().with_inner_size([900., 600.]),
        ..Default::default()
    };
    eframe::run_simple_native(INFO.name, options, move |ctx, _frame| {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    let mut listener = Listener::new();

                    for id in ParameterId::ALL {
                        listener +=
                            ui.add(Slider::new(controls.get_mut(id), 0.0..=1.0).text(id.name()));
                    }
                    if ui.button("Reset").clicked() {
                        controls = Controls::default();
                        listener += true;
                    }
                    ui.shrink_width_to_current();
                    ui.separator();

                    listener += ui.radio_value(&mut filter, Filter::Bilinear, "Bilinear");
                    listener += ui.radio_value(&mut filter, Filter::Nearest, "Nearest");
                    ui.separator();

                    ui.horizontal(|ui| {
                        if ui.button("Select Image").clicked() {
                            let path = rfd::FileDialog::new()
                                .add_filter("Image", &["jpg", "jpeg", "png", "bmp", "gif", "webp"])
                                .pick_file();
                            if let Some(path) = path {
                                match image::open(&path) {
                                    Ok(img) => {
                                        log::info!("opened {}", path.display());
                                        image = Some(Arc::new(img.to_rgba8()));
                                        listener += true;
                                    }
                                    Err(e) => show_error(format!("Failed to open image: {}", e)),
                                }
                            }
                        }

                        if ui.button("Save Image").clicked() {
                            if let Some(out_image) = &*out_image.read() {
                                let path = rfd::FileDialog::new()
                                    .add_filter("Image", &["png"])
                                    .set_file_name("output.png")
                                    .save_file();
                                if let Some(path) = path {
                                    match out_image.save(&path) {
                                        Ok(()) => log::info!("saved {}", path.display()),
                                        Err(e) => {
                                            show_error(format!("Failed to save image: {}", e))
                                        }
                                    }
                                }
                            }
                        }
                    });

                    if listener.changed() {
                        if let Err(e) = effect.set_controls(controls) {
                            log::warn!("{e}");
                        }
                        dirty = true;
                    }

                    if processing.load(Ordering::Relaxed) {
                        ui.spinner();
                        return;
                    }
                    let Some(image) = image.as_ref().filter(|_| dirty) else {
                        return;
                    };
                    dirty = false;

                    let image = Arc::clone(image);
                    let effect = effect.clone();
                    let config = RenderConfig {
                        filter,
                        output_size: Some(SURFACE_SIZE),
                    };
                    let out_image = Arc::clone(&out_image);
                    let out_tex = Arc::clone(&out_tex);
                    let processing = Arc::clone(&processing);
                    let tex_manager = ctx.tex_manager();
                    let ctx = ctx.clone();
                    processing.store(true, Ordering::Relaxed);
                    thread::spawn(move || {
                        match effect.process(Some(&image), &config) {
                            Ok(out) => {
                                let size = [out.width() as usize, out.height() as usize];
                                let mut tex_manager = tex_manager.write();
                                let id = tex_manager.alloc(
                                    "out".into(),
                                    ColorImage::from_rgba_unmultiplied(size, out.as_raw()).into(),
                                    Default::default(),
                                );
                                let tex = SizedTexture::new(id, [size[0] as f32, size[1] as f32]);
                                if let Some(old) = out_tex.write().replace(tex) {
                                    tex_manager.free(old.id);
                                }
                                out_image.write().replace(out);
                            }
                            Err(e) => log::error!("render failed: {e}"),
                        }
                        processing.store(false, Ordering::Relaxed);
                        ctx.request_repaint();
                    });
                });

                if let Some(out_tex) = *out_tex.read() {
                    ui.image(ImageSource::Texture(out_tex));
                }
            });
        });
    })
}
