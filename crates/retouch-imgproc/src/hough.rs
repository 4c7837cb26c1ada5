use std::f32::consts::PI;

use retouch_image::Image;

/// A straight line in polar form, as returned by [`hough_lines`].
///
/// The line satisfies `x * cos(theta) + y * sin(theta) = rho`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughLine {
    /// Distance from the origin to the line, in pixels.
    pub rho: f32,
    /// Angle of the line normal, in radians, in `[0, pi)`.
    pub theta: f32,
    /// Number of edge pixels that voted for the line.
    pub votes: usize,
}

impl HoughLine {
    /// The offset of the line direction from horizontal, in degrees.
    ///
    /// A horizontal line has a vertical normal (`theta = pi/2`), so the
    /// offset is `theta_degrees - 90`.
    pub fn angle_from_horizontal(&self) -> f32 {
        self.theta.to_degrees() - 90.0
    }
}

/// Find straight lines in a binary edge map with a Hough accumulator.
///
/// The accumulator uses a resolution of one pixel in `rho` and one
/// degree in `theta`. Cells with at least `threshold` votes that are
/// local maxima over their immediate neighborhood are returned, sorted
/// by decreasing vote count.
///
/// # Arguments
///
/// * `edges` - The edge map; any non-zero pixel votes.
/// * `threshold` - The minimum number of votes for a line.
pub fn hough_lines(edges: &Image<u8, 1>, threshold: usize) -> Vec<HoughLine> {
    let (cols, rows) = (edges.cols(), edges.rows());
    if cols == 0 || rows == 0 {
        return Vec::new();
    }

    let num_thetas = 180usize;
    let max_rho = ((cols * cols + rows * rows) as f32).sqrt().ceil() as isize;
    let num_rhos = (2 * max_rho + 1) as usize;

    let trig: Vec<(f32, f32)> = (0..num_thetas)
        .map(|t| {
            let theta = t as f32 * PI / num_thetas as f32;
            (theta.cos(), theta.sin())
        })
        .collect();

    let mut accumulator = vec![0usize; num_thetas * num_rhos];
    for y in 0..rows {
        for x in 0..cols {
            if edges.pix(x, y, 0) == 0 {
                continue;
            }
            for (t, &(cos_t, sin_t)) in trig.iter().enumerate() {
                let rho = x as f32 * cos_t + y as f32 * sin_t;
                let rho_idx = (rho.round() as isize + max_rho) as usize;
                accumulator[t * num_rhos + rho_idx] += 1;
            }
        }
    }

    let mut lines = Vec::new();
    for t in 0..num_thetas {
        for r in 0..num_rhos {
            let votes = accumulator[t * num_rhos + r];
            if votes < threshold.max(1) {
                continue;
            }

            // keep only local maxima over the 4-neighborhood
            let left = if r > 0 {
                accumulator[t * num_rhos + r - 1]
            } else {
                0
            };
            let right = if r + 1 < num_rhos {
                accumulator[t * num_rhos + r + 1]
            } else {
                0
            };
            let up = if t > 0 {
                accumulator[(t - 1) * num_rhos + r]
            } else {
                0
            };
            let down = if t + 1 < num_thetas {
                accumulator[(t + 1) * num_rhos + r]
            } else {
                0
            };

            if votes >= left && votes > right && votes >= up && votes > down {
                lines.push(HoughLine {
                    rho: (r as isize - max_rho) as f32,
                    theta: t as f32 * PI / num_thetas as f32,
                    votes,
                });
            }
        }
    }

    lines.sort_by(|a, b| b.votes.cmp(&a.votes));
    lines
}
