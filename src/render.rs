use image::RgbaImage;
use nalgebra::vector;
use rayon::prelude::*;

use crate::{
    projection::{Projection, Vec2f},
    sampler::{sample, Filter, TRANSPARENT},
};

/// Position of the center of pixel `(x, y)` in `[-1, 1]²`, with `y` pointing up.
pub fn normalized_position(x: u32, y: u32, width: u32, height: u32) -> Vec2f {
    let uv = vector![
        (x as f32 + 0.5) / width as f32,
        1.0 - (y as f32 + 0.5) / height as f32
    ];
    uv.map(|t| 2.0 * t - 1.0)
}

/// Fill `out` by pulling every pixel through `proj` from `img`.
pub fn fisheye_rotation(img: &RgbaImage, out: &mut RgbaImage, proj: &Projection, filter: Filter) {
    let (width, height) = out.dimensions();
    out.enumerate_pixels_mut()
        .par_bridge()
        .for_each(|(x, y, pixel)| {
            let pos = normalized_position(x, y, width, height);
            *pixel = match proj.proj(pos) {
                Some(coord) => sample(img, coord, filter),
                None => TRANSPARENT,
            };
        });
}
