//! Scene change detection between consecutive sampled frames.
//!
//! Both frames are reduced to an 8-bit grayscale intensity histogram
//! (256 bins) and compared with the correlation metric. A correlation
//! below [`SCENE_CHANGE_THRESHOLD`] marks the current frame as a cut.

use image::{imageops, RgbImage};
use tracing::debug;

pub const SCENE_CHANGE_THRESHOLD: f64 = 0.7;

const BINS: usize = 256;

pub type Histogram = [f64; BINS];

pub fn gray_histogram(frame: &RgbImage) -> Histogram {
    let gray = imageops::grayscale(frame);
    let mut histogram = [0.0; BINS];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1.0;
    }
    histogram
}

/// Pearson correlation of two histograms, in [-1, 1].
///
/// Returns 1.0 when either histogram has zero variance.
pub fn correlation(a: &Histogram, b: &Histogram) -> f64 {
    let mean_a = a.iter().sum::<f64>() / BINS as f64;
    let mean_b = b.iter().sum::<f64>() / BINS as f64;

    let mut cross = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cross += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denominator = var_a * var_b;
    if denominator.abs() > f64::EPSILON {
        cross / denominator.sqrt()
    } else {
        1.0
    }
}

/// Carries the previous sample's histogram across iterations.
#[derive(Default)]
pub struct SceneChangeDetector {
    previous: Option<Histogram>,
}

impl SceneChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next sampled frame. The first frame is never a scene change.
    pub fn check_frame(&mut self, frame: &RgbImage) -> bool {
        let histogram = gray_histogram(frame);

        let changed = match &self.previous {
            Some(previous) => {
                let score = correlation(previous, &histogram);
                let changed = score < SCENE_CHANGE_THRESHOLD;
                if changed {
                    debug!(correlation = format!("{:.3}", score), "Scene change");
                }
                changed
            }
            None => false,
        };

        self.previous = Some(histogram);
        changed
    }
}
