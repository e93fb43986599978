use machine_vision_formats::PixFmt;

/// Render a moving diagonal gradient so consecutive frames differ.
pub(crate) fn synthesize(width: usize, height: usize, pixel_format: PixFmt, fno: usize) -> Vec<u8> {
    let shift = fno.wrapping_mul(4);
    match pixel_format {
        PixFmt::RGB8 => {
            let mut buf = Vec::with_capacity(width * height * 3);
            for y in 0..height {
                let g = (y * 255 / height.max(1)) as u8;
                for x in 0..width {
                    buf.push((x.wrapping_add(shift) & 0xff) as u8);
                    buf.push(g);
                    buf.push((shift & 0xff) as u8);
                }
            }
            buf
        }
        _ => {
            let mut buf = Vec::with_capacity(width * height);
            for y in 0..height {
                buf.extend((0..width).map(|x| (x.wrapping_add(y).wrapping_add(shift) & 0xff) as u8));
            }
            buf
        }
    }
}

/// Mirror each row of a packed image in place.
pub(crate) fn flip_horizontal(buf: &mut [u8], width: usize, bytes_per_pixel: usize) {
    let row_len = width * bytes_per_pixel;
    if row_len == 0 {
        return;
    }
    for row in buf.chunks_exact_mut(row_len) {
        for x in 0..width / 2 {
            let (left, right) = row.split_at_mut((width - 1 - x) * bytes_per_pixel);
            left[x * bytes_per_pixel..(x + 1) * bytes_per_pixel]
                .swap_with_slice(&mut right[..bytes_per_pixel]);
        }
    }
}

#[test]
fn test_flip_horizontal() {
    let mut mono = vec![1, 2, 3, 4, 5, 6];
    flip_horizontal(&mut mono, 3, 1);
    assert_eq!(mono, [3, 2, 1, 6, 5, 4]);

    let mut rgb = vec![1, 1, 1, 2, 2, 2];
    flip_horizontal(&mut rgb, 2, 3);
    assert_eq!(rgb, [2, 2, 2, 1, 1, 1]);
}

#[test]
fn test_synthesize_sizes() {
    assert_eq!(synthesize(16, 8, PixFmt::Mono8, 0).len(), 128);
    assert_eq!(synthesize(16, 8, PixFmt::RGB8, 3).len(), 384);
    assert_ne!(
        synthesize(16, 8, PixFmt::Mono8, 0),
        synthesize(16, 8, PixFmt::Mono8, 1)
    );
}
