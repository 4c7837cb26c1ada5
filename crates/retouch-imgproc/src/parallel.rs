use rayon::prelude::*;

use retouch_image::Image;

/// Apply a function to each pixel of the image, rows in parallel.
///
/// The source and destination images must have the same number of rows;
/// the per-pixel function receives one source pixel slice and one
/// destination pixel slice.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    let src_cols = src.cols();
    src.as_slice()
        .par_chunks_exact(C1 * src_cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * src_cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Apply a function to each value of the image, rows in parallel.
///
/// Like [`par_iter_rows`] but element-wise over single channel values.
pub fn par_iter_rows_val<T1, T2, const C: usize>(
    src: &Image<T1, C>,
    dst: &mut Image<T2, C>,
    f: impl Fn(&T1, &mut T2) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    let src_cols = src.cols();
    src.as_slice()
        .par_chunks_exact(C * src_cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C * src_cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .iter()
                .zip(dst_chunk.iter_mut())
                .for_each(|(src_val, dst_val)| {
                    f(src_val, dst_val);
                });
        });
}

/// Fill each destination row in parallel from its row index.
///
/// The function receives the row index and the mutable row slice.
pub fn par_fill_rows<T, const C: usize>(
    dst: &mut Image<T, C>,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) where
    T: Clone + Send + Sync,
{
    let dst_cols = dst.cols();
    dst.as_slice_mut()
        .par_chunks_exact_mut(C * dst_cols)
        .enumerate()
        .for_each(|(row, dst_chunk)| {
            f(row, dst_chunk);
        });
}
