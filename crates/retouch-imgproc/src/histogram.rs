use retouch_image::{Image, ImageError};

/// Compute the pixel intensity histogram of an image.
///
/// NOTE: this is limited to 8-bit 1-channel images.
///
/// # Arguments
///
/// * `src` - The input image to compute the histogram.
/// * `hist` - The output histogram, accumulated in place.
/// * `num_bins` - The number of bins to use for the histogram.
///
/// # Errors
///
/// Returns an error if the number of bins is invalid.
///
/// # Example
///
/// ```
/// use retouch_image::{Image, ImageSize};
/// use retouch_imgproc::histogram::compute_histogram;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
/// ).unwrap();
///
/// let mut histogram = vec![0; 3];
///
/// compute_histogram(&image, &mut histogram, 3).unwrap();
/// assert_eq!(histogram, vec![3, 3, 3]);
/// ```
pub fn compute_histogram(
    src: &Image<u8, 1>,
    hist: &mut [usize],
    num_bins: usize,
) -> Result<(), ImageError> {
    if num_bins == 0 || num_bins > 256 {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    if hist.len() != num_bins {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    let mut bin_lut = [0usize; 256];
    for (i, bin) in bin_lut.iter_mut().enumerate() {
        *bin = (i * num_bins) >> 8;
    }

    for &px in src.as_slice() {
        hist[bin_lut[px as usize]] += 1;
    }

    Ok(())
}

/// Build the global equalization lookup table for a 256-bin histogram.
///
/// The mapping stretches the cumulative distribution so that the first
/// occupied bin maps to 0 and the last to 255. A histogram with a single
/// occupied bin yields the identity mapping.
pub fn equalize_lut(hist: &[usize; 256]) -> [u8; 256] {
    let total: usize = hist.iter().sum();

    let mut cdf = [0usize; 256];
    let mut acc = 0usize;
    for (i, &count) in hist.iter().enumerate() {
        acc += count;
        cdf[i] = acc;
    }

    let cdf_min = cdf
        .iter()
        .zip(hist.iter())
        .find(|(_, &count)| count > 0)
        .map(|(&c, _)| c)
        .unwrap_or(0);

    let mut lut = [0u8; 256];
    if total == 0 || cdf_min == total {
        // empty or constant image: identity
        for (i, v) in lut.iter_mut().enumerate() {
            *v = i as u8;
        }
        return lut;
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    for (i, v) in lut.iter_mut().enumerate() {
        *v = ((cdf[i].saturating_sub(cdf_min)) as f64 * scale).round() as u8;
    }

    lut
}

/// Apply global histogram equalization to an 8-bit grayscale image.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output grayscale image, same size as `src`.
///
/// Precondition: the input and output images must have the same size.
pub fn equalize_hist(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let mut hist = [0usize; 256];
    for &px in src.as_slice() {
        hist[px as usize] += 1;
    }

    let lut = equalize_lut(&hist);

    crate::parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        *dst_val = lut[src_val as usize];
    });

    Ok(())
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into a grid of tiles; each tile gets its own
/// clipped equalization lookup table, and pixels are mapped by bilinear
/// interpolation between the four surrounding tile tables.
#[derive(Debug, Clone, Copy)]
pub struct Clahe {
    /// Contrast limit relative to the uniform bin height. Typical range 2.0..4.0.
    pub clip_limit: f32,
    /// Number of tiles along each axis.
    pub tile_grid: (usize, usize),
}

impl Default for Clahe {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_grid: (8, 8),
        }
    }
}

impl Clahe {
    /// Create a new CLAHE operator with the given clip limit and an 8x8 tile grid.
    pub fn new(clip_limit: f32) -> Self {
        Self {
            clip_limit,
            ..Default::default()
        }
    }

    /// Apply CLAHE to an 8-bit grayscale image.
    ///
    /// # Arguments
    ///
    /// * `src` - The input grayscale image.
    /// * `dst` - The output grayscale image, same size as `src`.
    ///
    /// Precondition: the input and output images must have the same size.
    pub fn apply(&self, src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
        if src.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                dst.cols(),
                dst.rows(),
            ));
        }

        let (grid_x, grid_y) = self.tile_grid;
        if grid_x == 0 || grid_y == 0 {
            return Err(ImageError::InvalidHistogramBins(0));
        }

        let (width, height) = (src.width(), src.height());
        let tile_w = width as f32 / grid_x as f32;
        let tile_h = height as f32 / grid_y as f32;

        // per-tile clipped equalization tables
        let mut luts = vec![[0u8; 256]; grid_x * grid_y];
        for ty in 0..grid_y {
            for tx in 0..grid_x {
                let x0 = (tx as f32 * tile_w) as usize;
                let x1 = (((tx + 1) as f32 * tile_w) as usize).min(width);
                let y0 = (ty as f32 * tile_h) as usize;
                let y1 = (((ty + 1) as f32 * tile_h) as usize).min(height);

                let mut hist = [0usize; 256];
                for y in y0..y1 {
                    for x in x0..x1 {
                        hist[src.pix(x, y, 0) as usize] += 1;
                    }
                }

                let area = (x1 - x0) * (y1 - y0);
                clip_histogram(&mut hist, self.clip_limit, area);

                let mut acc = 0usize;
                let lut = &mut luts[ty * grid_x + tx];
                for (i, &count) in hist.iter().enumerate() {
                    acc += count;
                    lut[i] = ((acc as f64 * 255.0) / area.max(1) as f64).round() as u8;
                }
            }
        }

        // bilinear blend between the four surrounding tile tables
        crate::parallel::par_fill_rows(dst, |y, dst_row| {
            let gy = (y as f32 + 0.5) / tile_h - 0.5;
            let ty0 = gy.floor().clamp(0.0, (grid_y - 1) as f32) as usize;
            let ty1 = (ty0 + 1).min(grid_y - 1);
            let fy = (gy - ty0 as f32).clamp(0.0, 1.0);

            for (x, dst_val) in dst_row.iter_mut().enumerate() {
                let gx = (x as f32 + 0.5) / tile_w - 0.5;
                let tx0 = gx.floor().clamp(0.0, (grid_x - 1) as f32) as usize;
                let tx1 = (tx0 + 1).min(grid_x - 1);
                let fx = (gx - tx0 as f32).clamp(0.0, 1.0);

                let v = src.pix(x, y, 0) as usize;
                let v00 = luts[ty0 * grid_x + tx0][v] as f32;
                let v01 = luts[ty0 * grid_x + tx1][v] as f32;
                let v10 = luts[ty1 * grid_x + tx0][v] as f32;
                let v11 = luts[ty1 * grid_x + tx1][v] as f32;

                let top = v00 * (1.0 - fx) + v01 * fx;
                let bottom = v10 * (1.0 - fx) + v11 * fx;
                *dst_val = (top * (1.0 - fy) + bottom * fy).round() as u8;
            }
        });

        Ok(())
    }
}

/// Clip a tile histogram at the given relative limit and redistribute
/// the excess evenly over all bins.
fn clip_histogram(hist: &mut [usize; 256], clip_limit: f32, area: usize) {
    let limit = ((clip_limit * area as f32 / 256.0) as usize).max(1);

    let mut excess = 0usize;
    for count in hist.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }

    let per_bin = excess / 256;
    let mut remainder = excess % 256;
    for count in hist.iter_mut() {
        *count += per_bin;
        if remainder > 0 {
            *count += 1;
            remainder -= 1;
        }
    }
}
