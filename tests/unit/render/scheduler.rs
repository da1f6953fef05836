use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;

use super::*;
use crate::assets::loader::MemoryOverlayLoader;
use crate::device::geometry::DeviceGeometry;

fn solid(w: u32, h: u32, px: [u8; 4]) -> RasterImage {
    RasterImage::from_straight_rgba8(w, h, px.repeat((w * h) as usize)).unwrap()
}

fn device(id: &str, overlay: &str) -> DeviceGeometry {
    DeviceGeometry {
        id: id.to_string(),
        name: id.to_string(),
        overlay: overlay.to_string(),
        frame_width: 20,
        frame_height: 10,
        screen_x: 2,
        screen_y: 2,
        screen_width: 16,
        screen_height: 6,
    }
}

fn overlay() -> RasterImage {
    let mut raw = Vec::with_capacity(20 * 10 * 4);
    for y in 0..10 {
        for x in 0..20 {
            let inside = (2..18).contains(&x) && (2..8).contains(&y);
            raw.extend_from_slice(if inside { &[0, 0, 0, 0] } else { &[0, 0, 0, 255] });
        }
    }
    RasterImage::from_straight_rgba8(20, 10, raw).unwrap()
}

fn tiny_loader() -> MemoryOverlayLoader {
    MemoryOverlayLoader::new().with_image("frames/tiny.png", overlay())
}

fn scheduler() -> (
    RenderScheduler<MemoryOverlayLoader>,
    mpsc::UnboundedReceiver<PreviewEvent>,
) {
    scheduler_with(tiny_loader())
}

fn scheduler_with(
    loader: MemoryOverlayLoader,
) -> (
    RenderScheduler<MemoryOverlayLoader>,
    mpsc::UnboundedReceiver<PreviewEvent>,
) {
    let mut registry = DeviceRegistry::new();
    registry.insert(device("tiny", "frames/tiny.png")).unwrap();
    registry.insert(device("broken", "frames/missing.png")).unwrap();

    let opts = StudioOpts {
        preview_scale: 0.5,
        preview_filter: crate::config::ResampleFilter::Nearest,
        export_filter: crate::config::ResampleFilter::Nearest,
        ..StudioOpts::default()
    };
    let (sched, rx) = RenderScheduler::new(Compositor::new(loader), registry, opts).unwrap();
    sched.set_device("tiny").unwrap();
    (sched, rx)
}

fn ready_surface(event: PreviewEvent) -> Arc<RenderedSurface> {
    match event {
        PreviewEvent::Ready { surface, .. } => surface,
        PreviewEvent::Failed { error, .. } => panic!("unexpected preview failure: {error}"),
    }
}

#[tokio::test(start_paused = true)]
async fn burst_of_changes_renders_once_with_latest_inputs() {
    let (sched, mut rx) = scheduler();

    sched.set_source(Some(solid(4, 4, [255, 0, 0, 255])));
    sched.set_fit_mode(FitMode::Stretch);
    sched.set_source(Some(solid(4, 4, [0, 0, 255, 255])));
    sched.set_fit_mode(FitMode::Stretch);
    assert!(sched.is_preview_pending());

    tokio::time::sleep(Duration::from_millis(150)).await;

    let surface = ready_surface(rx.try_recv().unwrap());
    assert_eq!((surface.width, surface.height), (10, 5));
    assert_eq!(surface.pixel(5, 2), Some([0, 0, 255, 255]));
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(!sched.is_preview_pending());
    assert_eq!(sched.compositor().overlays().loader().load_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn each_change_restarts_the_window() {
    let (sched, mut rx) = scheduler();

    sched.set_source(Some(solid(2, 2, [9, 9, 9, 255])));
    tokio::time::sleep(Duration::from_millis(60)).await;
    sched.set_fit_mode(FitMode::Stretch);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(sched.preview_surface().is_none());

    tokio::time::sleep(Duration::from_millis(60)).await;
    ready_surface(rx.try_recv().unwrap());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(sched.preview_surface().is_some());
}

#[tokio::test(start_paused = true)]
async fn clearing_the_image_cancels_and_clears_preview() {
    let (sched, mut rx) = scheduler();

    sched.set_source(Some(solid(2, 2, [9, 9, 9, 255])));
    tokio::time::sleep(Duration::from_millis(150)).await;
    ready_surface(rx.try_recv().unwrap());
    assert!(sched.preview_surface().is_some());

    sched.set_source(Some(solid(2, 2, [1, 2, 3, 255])));
    sched.set_source(None);
    assert!(!sched.is_preview_pending());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(sched.preview_surface().is_none());
}

#[tokio::test(start_paused = true)]
async fn failed_preview_is_reported_and_keeps_last_good_surface() {
    let (sched, mut rx) = scheduler();

    sched.set_source(Some(solid(2, 2, [9, 9, 9, 255])));
    tokio::time::sleep(Duration::from_millis(150)).await;
    let good = ready_surface(rx.try_recv().unwrap());

    sched.set_device("broken").unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    match rx.try_recv().unwrap() {
        PreviewEvent::Failed { device_id, error } => {
            assert_eq!(device_id, "broken");
            assert!(matches!(error, MockupError::ImageLoad { .. }));
        }
        PreviewEvent::Ready { .. } => panic!("expected a failure"),
    }
    assert!(Arc::ptr_eq(&good, &sched.preview_surface().unwrap()));
}

#[tokio::test(start_paused = true)]
async fn unknown_device_leaves_inputs_unchanged() {
    let (sched, _rx) = scheduler();
    let err = sched.set_device("tablet").unwrap_err();
    assert!(matches!(err, MockupError::UnknownDevice(_)));
    assert_eq!(sched.inputs().device_id, "tiny");
    assert!(!sched.is_preview_pending());
}

#[tokio::test(start_paused = true)]
async fn export_runs_immediately_at_export_scale() {
    let (sched, mut rx) = scheduler();
    sched.set_source(Some(solid(4, 4, [0, 255, 0, 255])));

    let artifact = sched.export(ExportFormat::Png, None).await.unwrap();
    assert_eq!((artifact.width, artifact.height), (20, 10));
    assert!(artifact.file_name.starts_with("mockup-tiny-"));
    assert!(artifact.file_name.ends_with(".png"));

    let decoded = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (20, 10));
    assert_eq!(decoded.get_pixel(10, 5).0, [0, 255, 0, 255]);
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert!(sched.export_surface().is_some());

    // The debounced preview still runs independently.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let preview = ready_surface(rx.try_recv().unwrap());
    assert_eq!((preview.width, preview.height), (10, 5));
}

#[tokio::test(start_paused = true)]
async fn jpeg_export_defaults_to_configured_quality() {
    let (sched, _rx) = scheduler();
    sched.set_source(Some(solid(4, 4, [200, 100, 50, 255])));

    let artifact = sched.export(ExportFormat::Jpeg, None).await.unwrap();
    assert!(artifact.file_name.ends_with(".jpg"));
    let surface = sched.export_surface().unwrap();
    let expected = encode_surface(&surface, ExportFormat::Jpeg, Some(0.95)).unwrap();
    assert_eq!(artifact.bytes, expected);
}

#[tokio::test(start_paused = true)]
async fn out_of_range_jpeg_quality_uses_configured_default() {
    let (sched, _rx) = scheduler();
    sched.set_source(Some(solid(4, 4, [10, 200, 30, 255])));

    let bad = sched.export(ExportFormat::Jpeg, Some(7.0)).await.unwrap();
    let default = sched.export(ExportFormat::Jpeg, None).await.unwrap();
    assert_eq!(bad.bytes, default.bytes);
}

#[tokio::test(start_paused = true)]
async fn export_without_image_fails() {
    let (sched, _rx) = scheduler();
    let err = sched.export(ExportFormat::Png, None).await.unwrap_err();
    assert!(matches!(err, MockupError::Validation(_)));
    assert!(sched.export_surface().is_none());
}

#[tokio::test(start_paused = true)]
async fn export_failure_produces_no_artifact() {
    let (sched, _rx) = scheduler();
    sched.set_source(Some(solid(4, 4, [1, 1, 1, 255])));
    sched.set_device("broken").unwrap();
    let err = sched.export(ExportFormat::Png, None).await.unwrap_err();
    assert!(matches!(err, MockupError::ImageLoad { .. }));
    assert!(sched.export_surface().is_none());
}

#[test]
fn empty_registry_is_rejected() {
    let result = RenderScheduler::new(
        Compositor::new(MemoryOverlayLoader::new()),
        DeviceRegistry::new(),
        StudioOpts::default(),
    );
    assert!(matches!(result, Err(MockupError::Validation(_))));
}

#[tokio::test(start_paused = true)]
async fn input_change_during_preview_render_wins() {
    let (sched, mut rx) = scheduler_with(tiny_loader().with_latency(Duration::from_millis(50)));

    sched.set_source(Some(solid(4, 4, [255, 0, 0, 255])));
    // Debounce elapsed at 100ms; the overlay load is still in flight.
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(sched.is_preview_pending());

    sched.set_source(Some(solid(4, 4, [0, 0, 255, 255])));
    tokio::time::sleep(Duration::from_millis(400)).await;

    let surface = ready_surface(rx.try_recv().unwrap());
    assert_eq!(surface.pixel(5, 2), Some([0, 0, 255, 255]));
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(Arc::ptr_eq(&surface, &sched.preview_surface().unwrap()));
}

#[tokio::test(start_paused = true)]
async fn failure_for_outdated_inputs_is_not_reported() {
    let (sched, mut rx) = scheduler_with(tiny_loader().with_latency(Duration::from_millis(50)));
    sched.set_source(Some(solid(2, 2, [9, 9, 9, 255])));
    sched.set_device("broken").unwrap();
    sched.cancel_preview();

    let shared = Arc::clone(&sched.shared);
    let request = shared.request_for(0.5, &sched.inputs()).unwrap();
    let epoch = shared.lock_pending().epoch;

    // A newer schedule lands after the render started but without retiring its ticket.
    tokio::join!(shared.run_preview(epoch, request), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        shared.lock_pending().epoch += 1;
    });

    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(sched.preview_surface().is_none());
}

#[tokio::test(start_paused = true)]
async fn overtaken_export_is_superseded() {
    let (sched, _rx) = scheduler_with(tiny_loader().with_latency(Duration::from_millis(50)));
    sched.set_source(Some(solid(4, 4, [0, 255, 0, 255])));

    let (first, second) = tokio::join!(
        sched.export(ExportFormat::Png, None),
        sched.export(ExportFormat::Png, None)
    );
    assert!(matches!(first, Err(MockupError::Superseded)));
    let artifact = second.unwrap();
    assert_eq!((artifact.width, artifact.height), (20, 10));
    assert!(!artifact.bytes.is_empty());
    assert!(sched.export_surface().is_some());
}

#[tokio::test(start_paused = true)]
async fn repeated_previews_resample_the_frame_once() {
    let (sched, mut rx) = scheduler();

    sched.set_source(Some(solid(4, 4, [1, 2, 3, 255])));
    tokio::time::sleep(Duration::from_millis(150)).await;
    ready_surface(rx.try_recv().unwrap());

    sched.set_fit_mode(FitMode::Stretch);
    tokio::time::sleep(Duration::from_millis(150)).await;
    ready_surface(rx.try_recv().unwrap());

    assert_eq!(sched.compositor().overlays().resample_count(), 1);
}
