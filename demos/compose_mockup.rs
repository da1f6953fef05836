//! Compose a device mockup from an image on disk.
//!
//! ```text
//! cargo run --example compose_mockup -- <image> <frames-dir> [device] [png|jpg]
//! ```
//!
//! `<frames-dir>` must contain the overlay files named by the built-in registry
//! (`frames/iphone.png`, `frames/laptop.png`).

use mockup_forge::{
    Compositor, DeviceRegistry, ExportFormat, FitMode, FsOverlayLoader, PreviewEvent,
    RenderScheduler, StudioOpts, decode_source_image,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(image_path), Some(frames_dir)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: compose_mockup <image> <frames-dir> [device] [png|jpg]");
    };
    let device = args.next().unwrap_or_else(|| "iphone".to_string());
    let format = match args.next().as_deref() {
        Some("jpg") | Some("jpeg") => ExportFormat::Jpeg,
        _ => ExportFormat::Png,
    };

    let bytes = std::fs::read(&image_path)?;
    let source = decode_source_image(&bytes)?;

    let (studio, mut previews) = RenderScheduler::new(
        Compositor::new(FsOverlayLoader::new(frames_dir)),
        DeviceRegistry::builtin(),
        StudioOpts::default(),
    )?;
    studio.set_device(&device)?;
    studio.set_fit_mode(FitMode::AspectFit);
    studio.set_source(Some(source));

    match previews.recv().await {
        Some(PreviewEvent::Ready { surface, .. }) => {
            tracing::info!(width = surface.width, height = surface.height, "preview ready");
        }
        Some(PreviewEvent::Failed { error, .. }) => return Err(error.into()),
        None => anyhow::bail!("preview channel closed"),
    }

    let artifact = studio.export(format, None).await?;
    std::fs::write(&artifact.file_name, &artifact.bytes)?;
    tracing::info!(file = %artifact.file_name, "wrote mockup");
    Ok(())
}
