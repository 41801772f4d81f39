//! User interface using egui.
//!
//! Side panel with scene controls, animation readouts and a controls overlay.

use egui::Context;

use crate::animation::{WindSpeed, MAX_WIND_SPEED, MIN_WIND_SPEED};
use crate::renderer::camera::Projection;
use crate::renderer::LightingConfig;
use crate::scene::SceneState;

/// UI state and rendering.
pub struct Ui {
    /// Whether the side panel is visible
    pub panel_visible: bool,
}

impl Ui {
    pub fn new() -> Self {
        Self {
            panel_visible: true,
        }
    }

    /// Render the UI, applying edits directly to `scene` and `lighting`.
    pub fn render(
        &mut self,
        ctx: &Context,
        scene: &mut SceneState,
        lighting: &mut LightingConfig,
        fps: f32,
    ) -> UiResponse {
        let mut response = UiResponse::default();

        // Toggle panel with Tab key
        if ctx.input(|i| i.key_pressed(egui::Key::Tab)) {
            self.panel_visible = !self.panel_visible;
        }

        if self.panel_visible {
            egui::SidePanel::left("controls")
                .default_width(220.0)
                .show(ctx, |ui| {
                    ui.heading("windscape");
                    ui.separator();

                    // Performance
                    ui.label(format!("FPS: {:.1}", fps));
                    ui.separator();

                    // Scene section
                    ui.collapsing("Scene", |ui| {
                        let mut wind = scene.wind_speed.get();
                        ui.horizontal(|ui| {
                            ui.label("Wind:");
                            if ui
                                .add(
                                    egui::Slider::new(&mut wind, MIN_WIND_SPEED..=MAX_WIND_SPEED)
                                        .step_by(0.1),
                                )
                                .changed()
                            {
                                scene.wind_speed = WindSpeed::new(wind);
                            }
                        });

                        ui.checkbox(&mut scene.animation_enabled, "Animate");
                        ui.checkbox(&mut scene.lighting_enabled, "Lighting");

                        ui.horizontal(|ui| {
                            ui.label("Projection:");
                            ui.selectable_value(
                                &mut scene.projection,
                                Projection::Perspective,
                                "Perspective",
                            );
                            ui.selectable_value(
                                &mut scene.projection,
                                Projection::Orthographic,
                                "Ortho",
                            );
                        });

                        ui.add_enabled_ui(scene.lighting_enabled, |ui| {
                            let mut ambient = lighting.ambient.x;
                            ui.horizontal(|ui| {
                                ui.label("Ambient:");
                                if ui.add(egui::Slider::new(&mut ambient, 0.0..=1.0)).changed() {
                                    // Keep the blue bias of the default ambient
                                    lighting.ambient = glam::Vec3::new(ambient, ambient, ambient + 0.2);
                                }
                            });
                        });
                    });

                    ui.separator();

                    // Animation readouts
                    ui.collapsing("Animation", |ui| {
                        let animation = &scene.animation;
                        ui.label(format!("Blade rotation: {:.1}°", animation.blade_rotation));
                        ui.label(format!("Nacelle yaw: {:.2}°", animation.nacelle_yaw));
                        ui.label(format!("Tower sway: {:.3}", animation.tower_sway));
                        ui.label(format!("Time: {:.2} s", animation.time_accumulator));
                        ui.label(format!("Turbines: {}", scene.config.turbine_placements.len()));
                    });

                    ui.separator();

                    // Camera section
                    ui.collapsing("Camera", |ui| {
                        let camera = &mut scene.camera;
                        let p = camera.position;
                        ui.label(format!("Position: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
                        ui.label(format!("Pitch: {:.0}°  Yaw: {:.0}°", camera.pitch, camera.yaw));

                        ui.horizontal(|ui| {
                            ui.label("Zoom:");
                            ui.add(
                                egui::DragValue::new(&mut camera.zoom)
                                    .speed(1.0)
                                    .range(10.0..=120.0),
                            );
                        });

                        if ui.button("Reset Camera").clicked() {
                            response.reset_camera = true;
                        }
                    });

                    ui.separator();

                    // Help section
                    ui.collapsing("Controls", |ui| {
                        ui.label("W/S: Forward/Back");
                        ui.label("A/D: Left/Right");
                        ui.label("Q/E: Up/Down");
                        ui.label("Arrows: Look");
                        ui.label("+/- or Scroll: Zoom");
                        ui.label("Space: Animation");
                        ui.label("L: Lighting");
                        ui.label("P: Projection");
                        ui.label("1/2: Wind Speed");
                        ui.label("R: Reset Camera");
                        ui.label("Tab: Toggle Panel");
                        ui.label("ESC: Quit");
                    });
                });
        }

        response
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

/// Response from UI indicating what actions to take.
#[derive(Default)]
pub struct UiResponse {
    pub reset_camera: bool,
}
