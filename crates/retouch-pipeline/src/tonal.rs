//! Exposure and color corrections over the luminance and lightness
//! channels.

use retouch_image::{Image, ImageError};
use retouch_imgproc::color::{gray_from_rgb_u8, lab_from_rgb_u8, rgb_from_lab_u8};
use retouch_imgproc::enhance::adjust_brightness;
use retouch_imgproc::histogram::{equalize_hist, Clahe};

/// Configuration for the tonal corrections.
#[derive(Debug, Clone, Copy)]
pub struct TonalConfig {
    /// Contrast limit for the local equalization tiles.
    pub clip_limit: f32,
}

impl Default for TonalConfig {
    fn default() -> Self {
        Self { clip_limit: 2.0 }
    }
}

/// Equalizes the global exposure of an image.
///
/// The image is reduced to its luminance, equalized over the full
/// histogram, and replicated back to three channels; chrominance is
/// deliberately discarded. When `brightness` is set, the multiplicative
/// factor is applied after equalization.
pub fn global_exposure_correction(
    image: &Image<u8, 3>,
    brightness: Option<f32>,
) -> Result<Image<u8, 3>, ImageError> {
    let mut gray = Image::from_size_val(image.size(), 0u8)?;
    gray_from_rgb_u8(image, &mut gray)?;

    let mut equalized = Image::from_size_val(image.size(), 0u8)?;
    equalize_hist(&gray, &mut equalized)?;

    let rgb = equalized.to_rgb()?;

    match brightness {
        Some(factor) => {
            let mut brightened = Image::from_size_val(rgb.size(), 0u8)?;
            adjust_brightness(&rgb, factor, &mut brightened)?;
            Ok(brightened)
        }
        None => Ok(rgb),
    }
}

/// Evens out the tonal range with contrast-limited local equalization.
///
/// The lightness channel of the CIELAB representation is equalized per
/// tile with the configured clip limit; chrominance is untouched.
pub fn unify_tonal_range(image: &Image<u8, 3>, config: &TonalConfig) -> Result<Image<u8, 3>, ImageError> {
    equalize_lightness(image, |l, l_out| {
        Clahe::new(config.clip_limit).apply(l, l_out)
    })
}

/// Corrects the color balance with a global lightness equalization.
///
/// Same channel split as [`unify_tonal_range`], but the lightness is
/// equalized over the full histogram instead of per tile.
pub fn color_correction(image: &Image<u8, 3>) -> Result<Image<u8, 3>, ImageError> {
    equalize_lightness(image, equalize_hist)
}

/// Runs `f` over the lightness plane of the CIELAB representation and
/// converts the result back to RGB.
fn equalize_lightness<F>(image: &Image<u8, 3>, f: F) -> Result<Image<u8, 3>, ImageError>
where
    F: Fn(&Image<u8, 1>, &mut Image<u8, 1>) -> Result<(), ImageError>,
{
    let mut lab = Image::from_size_val(image.size(), 0u8)?;
    lab_from_rgb_u8(image, &mut lab)?;

    let lightness = lab.channel(0)?;
    let mut lightness_eq = Image::from_size_val(image.size(), 0u8)?;
    f(&lightness, &mut lightness_eq)?;

    let a = lab.channel(1)?;
    let b = lab.channel(2)?;
    let lab_eq = Image::from_channels([&lightness_eq, &a, &b])?;

    let mut rgb = Image::from_size_val(image.size(), 0u8)?;
    rgb_from_lab_u8(&lab_eq, &mut rgb)?;

    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_image::{Image, ImageError, ImageSize};

    /// A horizontal gradient confined to a narrow value range.
    fn low_contrast_image() -> Result<Image<u8, 3>, ImageError> {
        let size = ImageSize {
            width: 64,
            height: 64,
        };
        let mut image = Image::from_size_val(size, 0u8)?;
        for y in 0..size.height {
            for x in 0..size.width {
                let v = 100 + (x * 40 / size.width) as u8;
                for c in 0..3 {
                    image.set_pix(x, y, c, v);
                }
            }
        }
        Ok(image)
    }

    fn value_range(image: &Image<u8, 3>) -> (u8, u8) {
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        for &v in image.as_slice() {
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }

    #[test]
    fn global_exposure_stretches_contrast() -> Result<(), ImageError> {
        let image = low_contrast_image()?;
        let corrected = global_exposure_correction(&image, None)?;

        let (min_in, max_in) = value_range(&image);
        let (min_out, max_out) = value_range(&corrected);
        assert!(max_out - min_out > max_in - min_in);

        // grayscale output: all channels equal
        for pixel in corrected.as_slice().chunks_exact(3) {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
        }

        Ok(())
    }

    #[test]
    fn global_exposure_brightness_factor() -> Result<(), ImageError> {
        let image = low_contrast_image()?;
        let plain = global_exposure_correction(&image, None)?;
        let dimmed = global_exposure_correction(&image, Some(0.5))?;

        let sum = |img: &Image<u8, 3>| -> u64 {
            img.as_slice().iter().map(|&v| v as u64).sum()
        };
        assert!(sum(&dimmed) < sum(&plain));

        Ok(())
    }

    #[test]
    fn unify_tonal_range_keeps_dimensions() -> Result<(), ImageError> {
        let image = low_contrast_image()?;
        let corrected = unify_tonal_range(&image, &TonalConfig::default())?;
        assert_eq!(corrected.size(), image.size());
        Ok(())
    }

    #[test]
    fn color_correction_stretches_lightness() -> Result<(), ImageError> {
        let image = low_contrast_image()?;
        let corrected = color_correction(&image)?;

        let (min_in, max_in) = value_range(&image);
        let (min_out, max_out) = value_range(&corrected);
        assert!(max_out - min_out > max_in - min_in);

        Ok(())
    }
}
