use crate::filter::{gaussian_blur, spatial_gradient};
use retouch_image::{Image, ImageError};

/// Canny edge detector over an 8-bit grayscale image.
///
/// Runs a light Gaussian smoothing pass, Sobel gradients, non-maximum
/// suppression along the quantized gradient direction, and hysteresis
/// thresholding. Output pixels are 255 on edges and 0 elsewhere.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output edge map, same size as `src`.
/// * `low_threshold` - Weak edge threshold on the gradient magnitude.
/// * `high_threshold` - Strong edge threshold on the gradient magnitude.
///
/// # Errors
///
/// Returns an error if the sizes do not match.
pub fn canny(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    low_threshold: f32,
    high_threshold: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let src_f32 = src.cast::<f32>()?;

    let mut blurred = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    gaussian_blur(&src_f32, &mut blurred, 5, 1.4)?;

    let mut gx = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    let mut gy = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    spatial_gradient(&blurred, &mut gx, &mut gy)?;

    let (cols, rows) = (src.cols(), src.rows());

    let mut magnitude = vec![0.0f32; cols * rows];
    for (i, m) in magnitude.iter_mut().enumerate() {
        let dx = gx.as_slice()[i];
        let dy = gy.as_slice()[i];
        *m = (dx * dx + dy * dy).sqrt();
    }

    // non-maximum suppression along the quantized gradient direction
    let mut suppressed = vec![0.0f32; cols * rows];
    for y in 1..rows.saturating_sub(1) {
        for x in 1..cols.saturating_sub(1) {
            let idx = y * cols + x;
            let mag = magnitude[idx];
            if mag == 0.0 {
                continue;
            }

            let dx = gx.as_slice()[idx];
            let dy = gy.as_slice()[idx];
            let angle = dy.atan2(dx).to_degrees();
            let angle = if angle < 0.0 { angle + 180.0 } else { angle };

            let (n1, n2) = if !(22.5..157.5).contains(&angle) {
                (magnitude[idx - 1], magnitude[idx + 1])
            } else if angle < 67.5 {
                (magnitude[idx - cols - 1], magnitude[idx + cols + 1])
            } else if angle < 112.5 {
                (magnitude[idx - cols], magnitude[idx + cols])
            } else {
                (magnitude[idx - cols + 1], magnitude[idx + cols - 1])
            };

            if mag >= n1 && mag >= n2 {
                suppressed[idx] = mag;
            }
        }
    }

    // hysteresis: start from strong pixels, grow into connected weak ones
    let out = dst.as_slice_mut();
    out.fill(0);

    let mut stack = Vec::new();
    for (idx, &mag) in suppressed.iter().enumerate() {
        if mag >= high_threshold && out[idx] == 0 {
            out[idx] = 255;
            stack.push(idx);

            while let Some(current) = stack.pop() {
                let cx = (current % cols) as isize;
                let cy = (current / cols) as isize;

                for ny in (cy - 1)..=(cy + 1) {
                    for nx in (cx - 1)..=(cx + 1) {
                        if nx < 0 || ny < 0 || nx >= cols as isize || ny >= rows as isize {
                            continue;
                        }
                        let nidx = ny as usize * cols + nx as usize;
                        if out[nidx] == 0 && suppressed[nidx] >= low_threshold {
                            out[nidx] = 255;
                            stack.push(nidx);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use retouch_image::{Image, ImageError, ImageSize};

    fn vertical_edge_image(size: ImageSize) -> Result<Image<u8, 1>, ImageError> {
        let data = (0..size.height)
            .flat_map(|_| (0..size.width).map(|x| if x < size.width / 2 { 0 } else { 255 }))
            .collect();
        Image::new(size, data)
    }

    #[test]
    fn canny_output_is_binary() -> Result<(), ImageError> {
        let image = vertical_edge_image(ImageSize {
            width: 32,
            height: 32,
        })?;

        let mut edges = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::canny(&image, &mut edges, 50.0, 150.0)?;

        assert!(edges.as_slice().iter().all(|&v| v == 0 || v == 255));

        Ok(())
    }

    #[test]
    fn canny_finds_step_edge() -> Result<(), ImageError> {
        let image = vertical_edge_image(ImageSize {
            width: 32,
            height: 32,
        })?;

        let mut edges = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::canny(&image, &mut edges, 50.0, 150.0)?;

        // edge pixels concentrate around the step column
        let edge_count = edges.as_slice().iter().filter(|&&v| v == 255).count();
        assert!(edge_count > 0);

        let step = image.width() / 2;
        for y in 2..image.height() - 2 {
            let found = (step - 2..=step + 1).any(|x| edges.pix(x, y, 0) == 255);
            assert!(found, "no edge response near the step at row {y}");
        }

        Ok(())
    }

    #[test]
    fn canny_flat_image_has_no_edges() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 16,
                height: 16,
            },
            128,
        )?;

        let mut edges = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::canny(&image, &mut edges, 50.0, 150.0)?;

        assert!(edges.as_slice().iter().all(|&v| v == 0));

        Ok(())
    }
}
