use image::{Pixel, Rgba, RgbaImage};
use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use crate::projection::Vec2f;

type Vec4u8 = SVector<u8, 4>;
type Vec4f = SVector<f32, 4>;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Nearest,
    #[default]
    Bilinear,
}

/// Sample `img` at a texture coordinate in `[0, 1]²`.
///
/// `v` grows upward, so `v = 1` is the first row. Anything outside the
/// unit square, NaN included, comes back transparent.
pub fn sample(img: &RgbaImage, coord: Vec2f, filter: Filter) -> Rgba<u8> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 || !in_unit_range(coord.x) || !in_unit_range(coord.y) {
        return TRANSPARENT;
    }
    let x = coord.x * width as f32;
    let y = (1.0 - coord.y) * height as f32;
    match filter {
        Filter::Nearest => nearest(img, x, y),
        Filter::Bilinear => bilinear_interpolation(img, x - 0.5, y - 0.5),
    }
}

fn in_unit_range(t: f32) -> bool {
    (0.0..=1.0).contains(&t)
}

fn nearest(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let (width, height) = img.dimensions();
    let x = (x as u32).min(width - 1);
    let y = (y as u32).min(height - 1);
    *img.get_pixel(x, y)
}

fn to_vec(p: &Rgba<u8>) -> Vec4f {
    Vec4u8::from_iterator(p.channels().iter().copied()).cast()
}

fn interpolation(q1: Vec4f, q2: Vec4f, t: f32) -> Vec4f {
    q1.scale(1.0 - t) + q2.scale(t)
}

fn bilinear_interpolation(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let (width, height) = img.dimensions();
    let x = x.clamp(0.0, (width - 1) as f32);
    let y = y.clamp(0.0, (height - 1) as f32);
    let x1 = x as u32;
    let y1 = y as u32;
    let x2 = (x1 + 1).min(width - 1);
    let y2 = (y1 + 1).min(height - 1);
    let tx = x - x1 as f32;
    let ty = y - y1 as f32;

    let r1 = interpolation(
        to_vec(img.get_pixel(x1, y1)),
        to_vec(img.get_pixel(x2, y1)),
        tx,
    );
    let r2 = interpolation(
        to_vec(img.get_pixel(x1, y2)),
        to_vec(img.get_pixel(x2, y2)),
        tx,
    );
    let q = interpolation(r1, r2, ty).map(|c| c.round().clamp(0.0, 255.0) as u8);
    Rgba([q[0], q[1], q[2], q[3]])
}
