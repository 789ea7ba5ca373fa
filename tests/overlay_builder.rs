use framefit::{
    build_overlay, try_build_overlay, FrameCatalog, FrameFitError, FrameTemplate, FrameWindow,
    Orientation, Point, Quad, RectWindow,
};

fn rect(x: f64, y: f64, width: f64, height: f64) -> RectWindow {
    RectWindow {
        x,
        y,
        width,
        height,
    }
}

fn trapezoid() -> Quad {
    Quad::from_corners([
        Point::new(120.0, 50.0),
        Point::new(880.0, 90.0),
        Point::new(910.0, 780.0),
        Point::new(90.0, 760.0),
    ])
}

#[test]
fn rect_window_maps_to_percentages() {
    let tpl = FrameTemplate::new(
        1000,
        1000,
        Orientation::Square,
        FrameWindow::Rect(rect(100.0, 100.0, 200.0, 300.0)),
    )
    .unwrap();
    let overlay = build_overlay("S-10x10", &tpl);
    let css = overlay.rect().unwrap().to_css();
    assert_eq!(css.left, "10.0000%");
    assert_eq!(css.top, "10.0000%");
    assert_eq!(css.width, "20.0000%");
    assert_eq!(css.height, "30.0000%");
}

#[test]
fn tilted_window_uses_perspective_mode() {
    let tpl = FrameTemplate::new(
        1000,
        800,
        Orientation::Horizontal,
        FrameWindow::Quad {
            quad: trapezoid(),
            fallback: Some(rect(100.0, 60.0, 800.0, 700.0)),
        },
    )
    .unwrap();
    let overlay = build_overlay("H-20x16-3d", &tpl);
    let p = overlay.perspective().unwrap();

    assert!((p.bounding_box.left - 9.0).abs() < 1e-9);
    assert!((p.bounding_box.top - 6.25).abs() < 1e-9);
    assert!((p.bounding_box.width - 82.0).abs() < 1e-9);
    assert!((p.bounding_box.height - 91.25).abs() < 1e-9);
    assert!(!p.transform.is_identity());
    assert_eq!(p.transform.matrix()[8], 1.0);

    let mapped = p.transform.apply(Point::new(1.0, 1.0)).unwrap();
    let expected = p.normalized_corners.bottom_right;
    assert!((mapped.x - expected.x).abs() < 1e-4);
    assert!((mapped.y - expected.y).abs() < 1e-4);
}

#[test]
fn collinear_quad_falls_back_to_rect() {
    let line = Quad::from_corners([
        Point::new(100.0, 100.0),
        Point::new(200.0, 200.0),
        Point::new(300.0, 300.0),
        Point::new(400.0, 400.0),
    ]);
    let tpl = FrameTemplate::new(
        1000,
        1000,
        Orientation::Square,
        FrameWindow::Quad {
            quad: line,
            fallback: Some(rect(100.0, 100.0, 800.0, 800.0)),
        },
    )
    .unwrap();
    let overlay = build_overlay("S-10x10", &tpl);
    assert!(!overlay.is_perspective());
    assert!((overlay.rect().unwrap().width - 80.0).abs() < 1e-9);
}

#[test]
fn flat_quad_without_rect_is_full_bleed() {
    let flat = Quad::from_corners([
        Point::new(100.0, 300.0),
        Point::new(500.0, 300.0),
        Point::new(700.0, 300.0),
        Point::new(900.0, 300.0),
    ]);
    let tpl = FrameTemplate::new(
        1000,
        1000,
        Orientation::Square,
        FrameWindow::Quad {
            quad: flat,
            fallback: None,
        },
    )
    .unwrap();
    assert!(build_overlay("S-10x10", &tpl).is_full_bleed());
    let err = try_build_overlay("S-10x10", &tpl).unwrap_err();
    assert_eq!(
        err,
        FrameFitError::MissingWindowData {
            key: "S-10x10".to_string()
        }
    );
}

#[test]
fn unknown_window_is_full_bleed() {
    let tpl = FrameTemplate::new(800, 800, Orientation::Square, FrameWindow::Unknown).unwrap();
    assert!(build_overlay("S-8x8", &tpl).is_full_bleed());
}

#[test]
fn descriptor_serializes_mode_and_css_strings() {
    let tpl = FrameTemplate::new(
        1000,
        800,
        Orientation::Horizontal,
        FrameWindow::Quad {
            quad: trapezoid(),
            fallback: None,
        },
    )
    .unwrap();
    let json = serde_json::to_value(build_overlay("H-20x16", &tpl)).unwrap();
    assert_eq!(json["mode"], "perspective");
    assert_eq!(json["boundingBox"]["left"], "9.0000%");
    assert_eq!(json["transform"].as_array().unwrap().len(), 9);
}

#[test]
fn catalog_quad_with_missing_label_uses_rect() {
    let text = r#"{
        "H-20x16-3d": {
            "orientation": "horizontal",
            "imageWidth": 1000,
            "imageHeight": 800,
            "topLeft": {"x": 100, "y": 80},
            "width": 800,
            "height": 640,
            "is3D": true,
            "points": [
                {"label": "topLeft", "x": 120, "y": 50},
                {"label": "topRight", "x": 880, "y": 90},
                {"label": "bottomRight", "x": 910, "y": 780}
            ]
        }
    }"#;
    let catalog = FrameCatalog::from_json_str(text).unwrap();
    let tpl = catalog.get("H-20x16-3d").unwrap();
    assert!(!tpl.is_perspective());
    let overlay = build_overlay("H-20x16-3d", tpl);
    let r = overlay.rect().unwrap();
    assert!((r.left - 10.0).abs() < 1e-9);
    assert!((r.height - 80.0).abs() < 1e-9);
}

#[test]
fn tilted_window_bounding_box_in_artwork_percent() {
    let quad = Quad::from_corners([
        Point::new(100.0, 50.0),
        Point::new(900.0, 80.0),
        Point::new(920.0, 780.0),
        Point::new(90.0, 750.0),
    ]);
    let tpl = FrameTemplate::new(
        1000,
        800,
        Orientation::Horizontal,
        FrameWindow::Quad {
            quad,
            fallback: None,
        },
    )
    .unwrap();
    let overlay = build_overlay("H-20x16-3d", &tpl);
    let p = overlay.perspective().unwrap();
    let css = p.bounding_box.to_css();
    assert_eq!(css.left, "9.0000%");
    assert_eq!(css.top, "6.2500%");
    assert_eq!(css.width, "83.0000%");
    assert_eq!(css.height, "91.2500%");
    assert!(!p.transform.is_identity());

    for (unit, corner) in Quad::unit()
        .corners()
        .iter()
        .zip(p.normalized_corners.corners().iter())
    {
        let mapped = p.transform.apply(*unit).unwrap();
        assert!((mapped.x - corner.x).abs() < 1e-4);
        assert!((mapped.y - corner.y).abs() < 1e-4);
    }
}
