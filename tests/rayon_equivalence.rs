#![cfg(feature = "rayon")]

use framefit::{
    match_frame_sizes, CompositeConfig, Compositor, FrameCatalog, FrameTemplate, FrameWindow,
    MemorySource, Orientation, OutputFormat, PhotoSource, Point, Quad, RectWindow,
};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn catalog() -> FrameCatalog {
    let rect = FrameWindow::Rect(RectWindow {
        x: 12.0,
        y: 9.0,
        width: 96.0,
        height: 72.0,
    });
    let quad = FrameWindow::Quad {
        quad: Quad::from_corners([
            Point::new(20.0, 12.0),
            Point::new(100.0, 20.0),
            Point::new(104.0, 80.0),
            Point::new(14.0, 74.0),
        ]),
        fallback: None,
    };
    FrameCatalog::from_entries([
        (
            "H-8x6",
            FrameTemplate::new(120, 90, Orientation::Horizontal, rect).unwrap(),
        ),
        (
            "H-12x9-3d",
            FrameTemplate::new(120, 90, Orientation::Horizontal, quad).unwrap(),
        ),
        (
            "H-10x7",
            FrameTemplate::new(120, 90, Orientation::Horizontal, rect).unwrap(),
        ),
    ])
}

#[test]
fn parallel_batch_matches_sequential() {
    let catalog = catalog();
    let mut artwork = MemorySource::new();
    artwork.insert("H-8x6", png_bytes(&RgbaImage::new(120, 90)));
    artwork.insert("H-12x9-3d", png_bytes(&RgbaImage::new(120, 90)));
    let photo = png_bytes(&gradient(64, 48));
    let candidates = match_frame_sizes(64, 48, &catalog, 4);
    assert_eq!(candidates.len(), 3);

    let run = |parallel: bool| {
        Compositor::new(&artwork)
            .with_config(CompositeConfig {
                format: OutputFormat::Png,
                parallel,
            })
            .composite_batch(&PhotoSource::Bytes(&photo), &candidates)
    };
    let sequential = run(false);
    let parallel = run(true);
    assert_eq!(sequential, parallel);
    assert_eq!(sequential.iter().filter(|o| o.result.is_ok()).count(), 2);
}
