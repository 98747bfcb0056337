//! The fisheye rotation effect as a host sees it: a described effect with
//! three indexed float parameters and one input image per frame.

use std::sync::Arc;

use egui::mutex::RwLock;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::{
    config::RenderConfig,
    error::{Error, Result},
    projection::{Projection, RotationParameters},
    render::fisheye_rotation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectInfo {
    /// Four character identifier.
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub version: (u32, u32),
    pub min_inputs: u32,
    pub max_inputs: u32,
}

pub const INFO: EffectInfo = EffectInfo {
    id: "FROT",
    name: "Fisheye Rotation",
    description: "Rotate Fisheye videos",
    version: (1, 0),
    min_inputs: 1,
    max_inputs: 1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ParameterId {
    Roll = 0,
    Pitch = 1,
    Yaw = 2,
}

impl ParameterId {
    pub const ALL: [ParameterId; 3] = [ParameterId::Roll, ParameterId::Pitch, ParameterId::Yaw];

    pub fn from_index(index: u32) -> Result<Self> {
        match index {
            0 => Ok(ParameterId::Roll),
            1 => Ok(ParameterId::Pitch),
            2 => Ok(ParameterId::Yaw),
            _ => Err(Error::UnknownParameter(index)),
        }
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            ParameterId::Roll => "Roll",
            ParameterId::Pitch => "Pitch",
            ParameterId::Yaw => "Yaw",
        }
    }
}

/// Raw control values in `[0, 1]`; `0.5` is no rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            roll: 0.5,
            pitch: 0.5,
            yaw: 0.5,
        }
    }
}

impl Controls {
    pub fn get(&self, id: ParameterId) -> f32 {
        match id {
            ParameterId::Roll => self.roll,
            ParameterId::Pitch => self.pitch,
            ParameterId::Yaw => self.yaw,
        }
    }

    pub fn get_mut(&mut self, id: ParameterId) -> &mut f32 {
        match id {
            ParameterId::Roll => &mut self.roll,
            ParameterId::Pitch => &mut self.pitch,
            ParameterId::Yaw => &mut self.yaw,
        }
    }

    pub fn rotation(&self) -> RotationParameters {
        RotationParameters::from_controls(self.roll, self.pitch, self.yaw)
    }
}

pub fn check_control(id: ParameterId, value: f32) -> Result<f32> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::ParameterOutOfRange {
            name: id.name(),
            value,
        })
    }
}

/// Effect instance. Cloning shares the control values, so one handle can
/// live on a UI thread while another renders.
#[derive(Clone)]
pub struct FisheyeRotation {
    controls: Arc<RwLock<Controls>>,
}

impl Default for FisheyeRotation {
    fn default() -> Self {
        Self::new()
    }
}

impl FisheyeRotation {
    pub fn new() -> Self {
        Self {
            controls: Arc::new(RwLock::new(Controls::default())),
        }
    }

    pub fn info(&self) -> &'static EffectInfo {
        &INFO
    }

    pub fn set_float_parameter(&self, index: u32, value: f32) -> Result<()> {
        let id = ParameterId::from_index(index)?;
        let value = check_control(id, value).map_err(|err| {
            log::warn!("rejected {}: {}", id.name(), err);
            err
        })?;
        *self.controls.write().get_mut(id) = value;
        Ok(())
    }

    pub fn float_parameter(&self, index: u32) -> Result<f32> {
        let id = ParameterId::from_index(index)?;
        Ok(self.controls.read().get(id))
    }

    /// Replace all three controls at once.
    pub fn set_controls(&self, controls: Controls) -> Result<()> {
        for id in ParameterId::ALL {
            check_control(id, controls.get(id))?;
        }
        *self.controls.write() = controls;
        Ok(())
    }

    /// All three controls read under one lock.
    pub fn snapshot(&self) -> Controls {
        *self.controls.read()
    }

    /// Render one frame of `input`.
    ///
    /// The controls are read once up front; updates that land while the
    /// frame is rendering apply to the next one.
    pub fn process(&self, input: Option<&RgbaImage>, config: &RenderConfig) -> Result<RgbaImage> {
        let input = input.ok_or(Error::MissingInput)?;
        let (width, height) = input.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        let (out_width, out_height) = config.output_dimensions((width, height));
        if out_width == 0 || out_height == 0 {
            return Err(Error::EmptyImage {
                width: out_width,
                height: out_height,
            });
        }

        let controls = self.snapshot();
        log::debug!(
            "rendering {}x{} from {}x{} with {:?}",
            out_width,
            out_height,
            width,
            height,
            controls
        );
        let proj = Projection::new(controls.rotation());
        let mut out = RgbaImage::new(out_width, out_height);
        fisheye_rotation(input, &mut out, &proj, config.filter);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::sampler::TRANSPARENT;

    #[test]
    fn describes_itself() {
        let effect = FisheyeRotation::new();
        assert_eq!(effect.info().id, "FROT");
        assert_eq!(effect.info().name, "Fisheye Rotation");
        assert_eq!((effect.info().min_inputs, effect.info().max_inputs), (1, 1));
    }

    #[test]
    fn parameters_default_to_center() {
        let effect = FisheyeRotation::new();
        for id in ParameterId::ALL {
            assert_eq!(effect.float_parameter(id.index()).unwrap(), 0.5);
        }
        assert_eq!(effect.snapshot().rotation(), RotationParameters::default());
    }

    #[test]
    fn parameters_are_addressed_by_index() {
        let effect = FisheyeRotation::new();
        effect.set_float_parameter(0, 0.1).unwrap();
        effect.set_float_parameter(1, 0.2).unwrap();
        effect.set_float_parameter(2, 0.3).unwrap();
        assert_eq!(
            effect.snapshot(),
            Controls {
                roll: 0.1,
                pitch: 0.2,
                yaw: 0.3
            }
        );
        assert_eq!(ParameterId::from_index(1).unwrap().name(), "Pitch");
    }

    #[test]
    fn rejects_unknown_index_and_bad_values() {
        let effect = FisheyeRotation::new();
        assert!(matches!(effect.set_float_parameter(3, 0.5), Err(Error::UnknownParameter(3))));
        assert!(matches!(effect.float_parameter(7), Err(Error::UnknownParameter(7))));
        assert!(matches!(
            effect.set_float_parameter(0, 1.5),
            Err(Error::ParameterOutOfRange { name: "Roll", .. })
        ));
        assert!(effect.set_float_parameter(2, f32::NAN).is_err());
        assert!(effect
            .set_controls(Controls {
                pitch: -0.1,
                ..Controls::default()
            })
            .is_err());
        assert_eq!(effect.snapshot(), Controls::default());
    }

    #[test]
    fn clones_share_controls() {
        let effect = FisheyeRotation::new();
        let handle = effect.clone();
        handle.set_float_parameter(2, 0.75).unwrap();
        assert_eq!(effect.float_parameter(2).unwrap(), 0.75);
    }

    #[test]
    fn process_requires_an_input() {
        let effect = FisheyeRotation::new();
        let config = RenderConfig::default();
        assert!(matches!(effect.process(None, &config), Err(Error::MissingInput)));

        let empty = RgbaImage::new(0, 4);
        assert!(matches!(
            effect.process(Some(&empty), &config),
            Err(Error::EmptyImage { width: 0, height: 4 })
        ));
    }

    #[test]
    fn process_uses_the_output_size() {
        let effect = FisheyeRotation::new();
        let input = RgbaImage::from_pixel(40, 20, Rgba([255, 0, 255, 255]));

        let out = effect.process(Some(&input), &RenderConfig::default()).unwrap();
        assert_eq!(out.dimensions(), (40, 20));

        let config = RenderConfig {
            output_size: Some([16, 16]),
            ..RenderConfig::default()
        };
        let out = effect.process(Some(&input), &config).unwrap();
        assert_eq!(out.dimensions(), (16, 16));
        assert_eq!(*out.get_pixel(8, 8), Rgba([255, 0, 255, 255]));
        assert_eq!(*out.get_pixel(0, 0), TRANSPARENT);
    }

    #[test]
    fn frames_render_while_controls_change() {
        let effect = FisheyeRotation::new();
        let input = RgbaImage::from_pixel(32, 32, Rgba([0, 255, 0, 255]));
        let writer = effect.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..=100 {
                writer
                    .set_controls(Controls {
                        roll: i as f32 / 100.0,
                        pitch: 1.0 - i as f32 / 100.0,
                        yaw: 0.5,
                    })
                    .unwrap();
            }
        });
        for _ in 0..10 {
            let out = effect.process(Some(&input), &RenderConfig::default()).unwrap();
            assert_eq!(out.dimensions(), (32, 32));
        }
        handle.join().unwrap();
        assert_eq!(effect.snapshot().roll, 1.0);
    }
}
