//! Assembles saved frames into an animated GIF.

use std::fs;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use tracing::info;

use super::output::list_frames;
use crate::error::{Error, Result};

/// Multiplier applied to the last frame's delay so the final layout lingers.
pub const FINAL_FRAME_HOLD: u32 = 10;

/// Reads every frame in `frames_dir` in natural order and writes a looping
/// GIF to `output`.
///
/// `delay_cs` is the per-frame delay in hundredths of a second; the last
/// frame is held [`FINAL_FRAME_HOLD`] times longer. Returns the number of
/// frames written.
///
/// # Errors
///
/// [`Error::NoFrames`] when the directory holds no files, [`Error::Image`]
/// on any decode or encode failure, [`Error::Io`] on read or write failure.
pub fn export_animation(frames_dir: &Path, output: &Path, delay_cs: u32) -> Result<usize> {
    let files = list_frames(frames_dir)?;
    if files.is_empty() {
        return Err(Error::NoFrames(frames_dir.to_path_buf()));
    }

    info!(frames = files.len(), output = %output.display(), "creating animation");

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| Error::image(output, e))?;

        let last = files.len() - 1;
        for (i, path) in files.iter().enumerate() {
            let img = image::open(path)
                .map_err(|e| Error::image(path, e))?
                .to_rgba8();
            let delay = if i == last {
                delay_cs.saturating_mul(FINAL_FRAME_HOLD)
            } else {
                delay_cs
            };
            let frame = Frame::from_parts(img, 0, 0, centiseconds(delay));
            encoder
                .encode_frame(frame)
                .map_err(|e| Error::image(output, e))?;
        }
    }

    fs::write(output, &bytes).map_err(|e| Error::io(output, e))?;
    info!(output = %output.display(), bytes = bytes.len(), "animation created");
    Ok(files.len())
}

fn centiseconds(cs: u32) -> Delay {
    Delay::from_numer_denom_ms(cs.saturating_mul(10), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba, RgbaImage};
    use std::io::Cursor;

    fn write_png(dir: &Path, name: &str, shade: u8) {
        let img = RgbaImage::from_pixel(4, 4, Rgba([shade, shade, shade, 255]));
        img.save(dir.join(name)).unwrap();
    }

    fn delay_ms(frame: &Frame) -> f64 {
        let (numer, denom) = frame.delay().numer_denom_ms();
        numer as f64 / denom as f64
    }

    #[test]
    fn test_export_animation_frames_and_delays() {
        let tmp = tempfile::tempdir().unwrap();
        let frames = tmp.path().join("frames");
        fs::create_dir(&frames).unwrap();
        write_png(&frames, "grid_10_9.png", 250);
        write_png(&frames, "grid_1_3.png", 0);
        write_png(&frames, "grid_2_4.png", 120);

        let output = tmp.path().join("out.gif");
        let count = export_animation(&frames, &output, 50).unwrap();
        assert_eq!(count, 3);

        let data = fs::read(&output).unwrap();
        let decoded = GifDecoder::new(Cursor::new(data))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(decoded.len(), 3);

        let delays: Vec<f64> = decoded.iter().map(delay_ms).collect();
        assert_eq!(delays, vec![500.0, 500.0, 5000.0]);

        // Natural order: darkest frame (grid_1) first, brightest (grid_10) last.
        let first = decoded[0].buffer().get_pixel(0, 0)[0];
        let last = decoded[2].buffer().get_pixel(0, 0)[0];
        assert!(first < 30, "first frame shade {first}");
        assert!(last > 220, "last frame shade {last}");
    }

    #[test]
    fn test_export_animation_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let err = export_animation(tmp.path(), &tmp.path().join("out.gif"), 50).unwrap_err();
        assert!(matches!(err, Error::NoFrames(_)));
    }

    #[test]
    fn test_export_animation_bad_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let frames = tmp.path().join("frames");
        fs::create_dir(&frames).unwrap();
        fs::write(frames.join("grid_1_1.png"), b"not a png").unwrap();

        let err = export_animation(&frames, &tmp.path().join("out.gif"), 50).unwrap_err();
        assert!(matches!(err, Error::Image { .. }));
    }
}
