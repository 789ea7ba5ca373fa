use framefit::{
    generate_previews, match_frame_sizes, probe_dimensions, CancelToken, CompositeConfig,
    Compositor, FrameCatalog, FrameFitError, FrameTemplate, FrameWindow, MemorySource,
    Orientation, OutputFormat, PhotoSource, Point, PreviewConfig, Quad, RectWindow,
};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

const RED: Rgba<u8> = Rgba([220, 30, 30, 255]);
const BLUE: Rgba<u8> = Rgba([20, 40, 200, 255]);

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn solid_photo(width: u32, height: u32) -> Vec<u8> {
    png_bytes(&RgbaImage::from_pixel(width, height, RED))
}

/// Opaque border of `border` pixels around a transparent hole.
fn frame_artwork(size: u32, border: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(size, size, |x, y| {
        let inside = x >= border && y >= border && x < size - border && y < size - border;
        if inside {
            Rgba([0, 0, 0, 0])
        } else {
            BLUE
        }
    });
    png_bytes(&img)
}

fn rect_template(size: u32, border: u32) -> FrameTemplate {
    let inner = f64::from(size - 2 * border);
    let window = FrameWindow::Rect(RectWindow {
        x: f64::from(border),
        y: f64::from(border),
        width: inner,
        height: inner,
    });
    FrameTemplate::new(size, size, Orientation::Square, window).unwrap()
}

fn png_config() -> CompositeConfig {
    CompositeConfig {
        format: OutputFormat::Png,
        parallel: false,
    }
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

fn close(a: Rgba<u8>, b: Rgba<u8>) -> bool {
    a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= 2)
}

#[test]
fn rect_window_shows_photo_under_artwork() {
    let artwork = MemorySource::new().with_asset("S-10x10", frame_artwork(100, 20));
    let photo = solid_photo(64, 48);
    let out = Compositor::new(&artwork)
        .with_config(png_config())
        .composite(&PhotoSource::Bytes(&photo), "S-10x10", &rect_template(100, 20))
        .unwrap();

    assert_eq!((out.width, out.height), (100, 100));
    let img = decode(&out.bytes);
    assert!(close(*img.get_pixel(50, 50), RED));
    assert!(close(*img.get_pixel(5, 5), BLUE));
    assert!(close(*img.get_pixel(95, 50), BLUE));
}

#[test]
fn quad_window_clips_photo_to_polygon() {
    let clear = png_bytes(&RgbaImage::new(100, 100));
    let artwork = MemorySource::new().with_asset("S-10x10-3d", clear);
    let diamond = Quad::from_corners([
        Point::new(50.0, 10.0),
        Point::new(90.0, 50.0),
        Point::new(50.0, 90.0),
        Point::new(10.0, 50.0),
    ]);
    let tpl = FrameTemplate::new(
        100,
        100,
        Orientation::Square,
        FrameWindow::Quad {
            quad: diamond,
            fallback: None,
        },
    )
    .unwrap();
    let photo = solid_photo(30, 30);
    let out = Compositor::new(&artwork)
        .with_config(png_config())
        .composite(&PhotoSource::Bytes(&photo), "S-10x10-3d", &tpl)
        .unwrap();

    let img = decode(&out.bytes);
    assert!(close(*img.get_pixel(50, 50), RED));
    assert_eq!(img.get_pixel(5, 5)[3], 0);
    assert_eq!(img.get_pixel(95, 95)[3], 0);
}

#[test]
fn jpeg_output_is_opaque_and_sized_to_template() {
    let artwork = MemorySource::new().with_asset("S-10x10", frame_artwork(80, 10));
    let photo = solid_photo(40, 40);
    let cfg = CompositeConfig {
        format: OutputFormat::Jpeg { quality: 80 },
        parallel: false,
    };
    let out = Compositor::new(&artwork)
        .with_config(cfg)
        .composite(&PhotoSource::Bytes(&photo), "S-10x10", &rect_template(80, 10))
        .unwrap();
    assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
    let img = image::load_from_memory(&out.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (80, 80));
}

#[test]
fn mismatched_artwork_is_resized_to_template() {
    let artwork = MemorySource::new().with_asset("S-10x10", frame_artwork(50, 10));
    let photo = solid_photo(40, 40);
    let out = Compositor::new(&artwork)
        .with_config(png_config())
        .composite(&PhotoSource::Bytes(&photo), "S-10x10", &rect_template(100, 20))
        .unwrap();
    assert_eq!((out.width, out.height), (100, 100));
}

#[test]
fn photo_and_artwork_failures_are_distinct() {
    let artwork = MemorySource::new().with_asset("S-10x10", frame_artwork(100, 20));
    let tpl = rect_template(100, 20);
    let compositor = Compositor::new(&artwork).with_config(png_config());

    let err = compositor
        .composite(&PhotoSource::Bytes(b"not an image"), "S-10x10", &tpl)
        .unwrap_err();
    assert!(matches!(err, FrameFitError::PhotoUnavailable { .. }));

    let photo = solid_photo(10, 10);
    let err = compositor
        .composite(&PhotoSource::Bytes(&photo), "S-12x12", &tpl)
        .unwrap_err();
    assert!(matches!(err, FrameFitError::ArtworkUnavailable { ref key, .. } if key == "S-12x12"));
    assert!(err.is_asset_error());
}

#[test]
fn template_without_window_fails_before_loading() {
    let artwork = MemorySource::new();
    let tpl = FrameTemplate::new(100, 100, Orientation::Square, FrameWindow::Unknown).unwrap();
    let err = Compositor::new(&artwork)
        .composite(&PhotoSource::Bytes(b""), "S-10x10", &tpl)
        .unwrap_err();
    assert!(matches!(err, FrameFitError::MissingWindowData { .. }));
}

#[test]
fn cancelled_token_stops_composite() {
    let artwork = MemorySource::new().with_asset("S-10x10", frame_artwork(100, 20));
    let photo = solid_photo(10, 10);
    let token = CancelToken::new();
    token.cancel();
    let err = Compositor::new(&artwork)
        .with_cancel_token(token)
        .composite(&PhotoSource::Bytes(&photo), "S-10x10", &rect_template(100, 20))
        .unwrap_err();
    assert_eq!(err, FrameFitError::Cancelled);
}

#[test]
fn batch_isolates_missing_artwork() {
    let catalog = FrameCatalog::from_entries([
        ("S-10x10", rect_template(100, 20)),
        ("S-12x12", rect_template(100, 20)),
    ]);
    let artwork = MemorySource::new().with_asset("S-10x10", frame_artwork(100, 20));
    let photo = solid_photo(30, 30);
    let candidates = match_frame_sizes(30, 30, &catalog, 4);
    assert_eq!(candidates.len(), 2);

    let outcomes = Compositor::new(&artwork)
        .with_config(png_config())
        .composite_batch(&PhotoSource::Bytes(&photo), &candidates);
    assert_eq!(outcomes.len(), 2);
    for (candidate, outcome) in candidates.iter().zip(&outcomes) {
        assert_eq!(candidate.size_token, outcome.size_token);
        match outcome.template_key.as_str() {
            "S-10x10" => assert!(outcome.result.is_ok()),
            "S-12x12" => assert!(matches!(
                outcome.result,
                Err(FrameFitError::ArtworkUnavailable { .. })
            )),
            other => panic!("unexpected key {other}"),
        }
    }
}

#[test]
fn batch_reports_photo_failure_for_every_candidate() {
    let catalog = FrameCatalog::from_entries([
        ("S-10x10", rect_template(100, 20)),
        ("S-12x12", rect_template(100, 20)),
    ]);
    let artwork = MemorySource::new()
        .with_asset("S-10x10", frame_artwork(100, 20))
        .with_asset("S-12x12", frame_artwork(100, 20));
    let candidates = match_frame_sizes(30, 30, &catalog, 4);
    let outcomes = Compositor::new(&artwork)
        .composite_batch(&PhotoSource::Bytes(b"garbage"), &candidates);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o.result, Err(FrameFitError::PhotoUnavailable { .. }))));
}

#[test]
fn photo_can_come_from_asset_source() {
    let photos = MemorySource::new().with_asset("user/photo.png", solid_photo(64, 48));
    let photo = PhotoSource::Asset {
        source: &photos,
        key: "user/photo.png",
    };
    assert_eq!(probe_dimensions(&photo).unwrap(), (64, 48));

    let missing = PhotoSource::Asset {
        source: &photos,
        key: "user/other.png",
    };
    assert!(matches!(
        probe_dimensions(&missing),
        Err(FrameFitError::PhotoUnavailable { .. })
    ));
}

#[test]
fn previews_rank_and_composite_each_candidate() {
    let horizontal = |w: u32, h: u32| {
        FrameTemplate::new(
            w,
            h,
            Orientation::Horizontal,
            FrameWindow::Rect(RectWindow {
                x: 10.0,
                y: 10.0,
                width: f64::from(w - 20),
                height: f64::from(h - 20),
            }),
        )
        .unwrap()
    };
    let catalog = FrameCatalog::from_entries([
        ("H-6x4", horizontal(120, 80)),
        ("H-8x6", horizontal(160, 120)),
        ("V-4x6", {
            let mut tpl = horizontal(80, 120);
            tpl.orientation = Orientation::Vertical;
            tpl
        }),
    ]);
    let artwork = MemorySource::new()
        .with_asset("H-6x4", png_bytes(&RgbaImage::new(120, 80)))
        .with_asset("H-8x6", png_bytes(&RgbaImage::new(160, 120)));
    let photo = solid_photo(40, 30);
    let cfg = PreviewConfig {
        composite: png_config(),
        ..PreviewConfig::default()
    };

    let previews =
        generate_previews(&PhotoSource::Bytes(&photo), None, &catalog, &artwork, cfg).unwrap();
    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0].size_token.as_str(), "8x6");
    assert!(previews[0].score <= previews[1].score);
    assert!(previews.iter().all(|p| p.outcome.is_ok()));
    assert!(previews.iter().all(|p| !p.is_perspective()));
}

#[test]
fn previews_with_unreadable_photo_and_no_dimensions_fail() {
    let catalog = FrameCatalog::default();
    let artwork = MemorySource::new();
    let err = generate_previews(
        &PhotoSource::Bytes(b"nope"),
        None,
        &catalog,
        &artwork,
        PreviewConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FrameFitError::PhotoUnavailable { .. }));
}

#[test]
fn previews_for_unmatched_photo_are_empty() {
    let catalog = FrameCatalog::from_entries([("S-10x10", rect_template(100, 20))]);
    let artwork = MemorySource::new();
    let previews = generate_previews(
        &PhotoSource::Bytes(b""),
        Some((4000, 3000)),
        &catalog,
        &artwork,
        PreviewConfig::default(),
    )
    .unwrap();
    assert!(previews.is_empty());
}

fn oversized_template() -> FrameTemplate {
    let window = FrameWindow::Rect(RectWindow {
        x: 10.0,
        y: 10.0,
        width: 100.0,
        height: 100.0,
    });
    FrameTemplate::new(60_000, 60_000, Orientation::Square, window).unwrap()
}

#[test]
fn oversized_canvas_is_an_error_not_a_panic() {
    let artwork = MemorySource::new().with_asset("S-10x10", frame_artwork(100, 20));
    let photo = solid_photo(10, 10);
    let compositor = Compositor::new(&artwork).with_config(png_config());

    let err = compositor
        .composite(&PhotoSource::Bytes(&photo), "S-10x10", &oversized_template())
        .unwrap_err();
    assert_eq!(
        err,
        FrameFitError::InvalidDimensions {
            width: 60_000,
            height: 60_000,
        }
    );

    let mut widest = rect_template(100, 20);
    widest.image_width = u32::MAX;
    widest.image_height = u32::MAX;
    let err = compositor
        .composite(&PhotoSource::Bytes(&photo), "S-10x10", &widest)
        .unwrap_err();
    assert!(matches!(err, FrameFitError::InvalidDimensions { .. }));
}

#[test]
fn oversized_candidate_does_not_take_down_siblings() {
    let catalog = FrameCatalog::from_entries([
        ("S-10x10", rect_template(100, 20)),
        ("S-12x12", oversized_template()),
    ]);
    let artwork = MemorySource::new()
        .with_asset("S-10x10", frame_artwork(100, 20))
        .with_asset("S-12x12", frame_artwork(100, 20));
    let photo = solid_photo(30, 30);
    let candidates = match_frame_sizes(30, 30, &catalog, 4);
    assert_eq!(candidates.len(), 2);

    let outcomes = Compositor::new(&artwork)
        .with_config(CompositeConfig {
            format: OutputFormat::Png,
            parallel: true,
        })
        .composite_batch(&PhotoSource::Bytes(&photo), &candidates);
    for outcome in &outcomes {
        match outcome.template_key.as_str() {
            "S-10x10" => assert!(outcome.result.is_ok()),
            "S-12x12" => assert!(matches!(
                outcome.result,
                Err(FrameFitError::InvalidDimensions { .. })
            )),
            other => panic!("unexpected key {other}"),
        }
    }
}

#[test]
fn clipped_photo_layer_has_no_artwork() {
    let no_artwork = MemorySource::new();
    let diamond = Quad::from_corners([
        Point::new(50.0, 10.0),
        Point::new(90.0, 50.0),
        Point::new(50.0, 90.0),
        Point::new(10.0, 50.0),
    ]);
    let tpl = FrameTemplate::new(
        100,
        100,
        Orientation::Square,
        FrameWindow::Quad {
            quad: diamond,
            fallback: None,
        },
    )
    .unwrap();
    let photo = solid_photo(30, 30);
    let out = Compositor::new(&no_artwork)
        .with_config(png_config())
        .clip_photo(&PhotoSource::Bytes(&photo), "S-10x10-3d", &tpl)
        .unwrap();

    assert_eq!((out.width, out.height), (100, 100));
    let img = decode(&out.bytes);
    assert!(close(*img.get_pixel(50, 50), RED));
    assert_eq!(img.get_pixel(5, 5)[3], 0);
    assert_eq!(img.get_pixel(50, 95)[3], 0);
}

#[test]
fn clipped_photo_layer_reports_photo_errors() {
    let no_artwork = MemorySource::new();
    let err = Compositor::new(&no_artwork)
        .clip_photo(&PhotoSource::Bytes(b"junk"), "S-10x10", &rect_template(100, 20))
        .unwrap_err();
    assert!(matches!(err, FrameFitError::PhotoUnavailable { .. }));
}
