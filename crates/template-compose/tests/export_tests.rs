use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::{Document, Object};
use rusttype::Font;
use std::collections::HashMap;
use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use template_compose::*;

// =============================================================================
// Test collaborators
// =============================================================================

/// Serves PNGs from memory; unknown URLs fail like a broken link would
#[derive(Default)]
struct MemoryFetcher {
    assets: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    fn with_png(mut self, url: &str, width: u32, height: u32) -> Self {
        let img = RgbaImage::from_pixel(width, height, Rgba([40, 90, 160, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        self.assets.insert(url.to_string(), bytes);
        self
    }
}

impl ImageFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| ComposeError::AssetLoad {
                url: url.to_string(),
                reason: "not found".to_string(),
            })
    }
}

/// A provider whose fonts never finish loading and has no fallback
struct NeverReady;

impl FontProvider for NeverReady {
    fn families(&self) -> Vec<String> {
        vec!["anton".to_string()]
    }

    fn ready(&self, _key: &FontKey) -> impl Future<Output = Option<ResolvedFace>> + Send {
        std::future::pending()
    }

    fn default_face(&self) -> Option<Arc<Font<'static>>> {
        None
    }
}

fn asset(id: u64, url: &str, category: Category) -> TemplateAsset {
    TemplateAsset {
        id,
        name: format!("template-{}", id),
        url: url.to_string(),
        category,
    }
}

fn pipeline(fetcher: MemoryFetcher) -> ExportPipeline<MemoryFetcher, NeverReady> {
    let options = ExportOptions {
        font_wait_ms: 20,
        ..Default::default()
    };
    ExportPipeline::new(Arc::new(fetcher), Arc::new(NeverReady), options).unwrap()
}

fn image_xobject_count(doc: &Document) -> usize {
    doc.objects
        .values()
        .filter(|obj| match obj {
            Object::Stream(stream) => stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false),
            _ => false,
        })
        .count()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_failed_asset_becomes_placeholder_and_is_counted() {
    let fetcher = MemoryFetcher::default()
        .with_png("a.png", 1080, 1080)
        .with_png("c.png", 540, 540);
    let mut session = Session::new();
    session.add_template(asset(1, "a.png", Category::Square));
    session.add_template(asset(2, "missing.png", Category::Square));
    session.add_template(asset(3, "c.png", Category::Square));

    let (instances, snapshot) = session.snapshot();
    let outcome = pipeline(fetcher).export(&instances, &snapshot).await;

    assert_eq!(outcome.failure_count, 1);
    assert_eq!(outcome.page_count, 1);

    let doc = Document::load_mem(&outcome.document).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    assert_eq!(image_xobject_count(&doc), 3);
}

#[tokio::test]
async fn test_export_pages_follow_categories() {
    let fetcher = MemoryFetcher::default()
        .with_png("phone.png", 1375, 1044)
        .with_png("banner.png", 1500, 500);
    let mut session = Session::new();
    for i in 0..5 {
        session.add_template(asset(i, "banner.png", Category::Rectangular));
    }
    session.add_template(asset(9, "phone.png", Category::Smartphone));

    let (instances, snapshot) = session.snapshot();
    let outcome = pipeline(fetcher).export(&instances, &snapshot).await;

    assert_eq!(outcome.failure_count, 0);
    assert_eq!(outcome.page_count, 3);

    let doc = Document::load_mem(&outcome.document).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
    assert_eq!(image_xobject_count(&doc), 6);
}

#[tokio::test]
async fn test_font_wait_is_bounded() {
    let fetcher = MemoryFetcher::default().with_png("a.png", 1080, 1080);
    let mut session = Session::new();
    let id = session.add_template(asset(1, "a.png", Category::Square));
    session.set_text(id, "Model", "ThinkPad").unwrap();
    session
        .set_style(id, "Model", StyleChange::FontFamily("Anton".into()))
        .unwrap();

    let (instances, snapshot) = session.snapshot();
    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        pipeline(fetcher).export(&instances, &snapshot),
    )
    .await
    .expect("export should not wait on fonts forever");

    // Falling back on fonts is not a failure
    assert_eq!(outcome.failure_count, 0);
    assert_eq!(outcome.page_count, 1);
}

#[tokio::test]
async fn test_preview_only_fetches_first_pages() {
    let fetcher = Arc::new(MemoryFetcher::default().with_png("a.png", 1080, 1080));
    let mut session = Session::new();
    for i in 0..9 {
        session.add_template(asset(i, "a.png", Category::Square));
    }

    let (instances, snapshot) = session.snapshot();
    let pipeline = ExportPipeline::new(fetcher.clone(), Arc::new(NeverReady), ExportOptions::default()).unwrap();
    let outcome = pipeline.preview(&instances, &snapshot, 1).await;

    assert_eq!(outcome.page_count, 1);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    let doc = Document::load_mem(&outcome.document).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[tokio::test]
async fn test_empty_selection() {
    let outcome = pipeline(MemoryFetcher::default())
        .export(&[], &StoreSnapshot::default())
        .await;

    assert_eq!(outcome.failure_count, 0);
    assert_eq!(outcome.page_count, 0);
    assert!(!outcome.document.is_empty());
}

#[tokio::test]
async fn test_retrying_fetcher_recovers_inside_export() {
    struct FailsOnce {
        inner: MemoryFetcher,
        failed: AtomicUsize,
    }

    impl ImageFetcher for FailsOnce {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            if self.failed.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ComposeError::AssetLoad {
                    url: url.to_string(),
                    reason: "connection reset".to_string(),
                });
            }
            self.inner.fetch(url).await
        }
    }

    let fetcher = RetryingFetcher::with_policy(
        FailsOnce {
            inner: MemoryFetcher::default().with_png("a.png", 1080, 1080),
            failed: AtomicUsize::new(0),
        },
        3,
        std::time::Duration::from_millis(1),
    );
    let mut session = Session::new();
    session.add_template(asset(1, "a.png", Category::Square));

    let (instances, snapshot) = session.snapshot();
    let pipeline = ExportPipeline::new(Arc::new(fetcher), Arc::new(NeverReady), ExportOptions::default()).unwrap();
    let outcome = pipeline.export(&instances, &snapshot).await;

    assert_eq!(outcome.failure_count, 0);
}

// =============================================================================
// Text with real faces
// =============================================================================

const DEJAVU_SANS: &[u8] = include_bytes!("fixtures/DejaVuSans.ttf");

/// Raw RGB bytes of the only image in a one-instance export
fn single_raster(document: &[u8]) -> Vec<u8> {
    let doc = Document::load_mem(document).unwrap();
    let images: Vec<_> = doc
        .objects
        .values()
        .filter_map(|obj| match obj {
            Object::Stream(stream)
                if stream.dict.get(b"Subtype").and_then(|s| s.as_name()).ok() == Some(b"Image".as_slice()) =>
            {
                Some(stream)
            }
            _ => None,
        })
        .collect();
    assert_eq!(images.len(), 1);
    if images[0].dict.has(b"Filter") {
        images[0].decompressed_content().unwrap()
    } else {
        images[0].content.clone()
    }
}

fn dark_pixels(rgb: &[u8]) -> usize {
    rgb.chunks_exact(3)
        .filter(|p| p.iter().all(|&c| c < 24))
        .count()
}

async fn export_model_text(fonts: FontRegistry, family: &str, text: &str) -> ExportOutcome {
    let fetcher = MemoryFetcher::default().with_png("a.png", 1080, 1080);
    let mut session = Session::new();
    let id = session.add_template(asset(1, "a.png", Category::Square));
    session.set_text(id, "Model", text).unwrap();
    session
        .set_style(id, "Model", StyleChange::FontFamily(family.into()))
        .unwrap();
    session
        .set_style(id, "Model", StyleChange::Color(Rgb::BLACK))
        .unwrap();

    let options = ExportOptions {
        font_wait_ms: 50,
        ..Default::default()
    };
    let pipeline = ExportPipeline::new(Arc::new(fetcher), Arc::new(fonts), options).unwrap();
    let (instances, snapshot) = session.snapshot();
    pipeline.export(&instances, &snapshot).await
}

#[tokio::test]
async fn test_missing_family_uses_default_face() {
    let mut fonts = FontRegistry::new();
    fonts
        .register(FontKey::regular("Helvetica"), DEJAVU_SANS.to_vec())
        .unwrap();

    let outcome = export_model_text(fonts.clone(), "No Such Family", "ThinkPad X1").await;
    assert_eq!(outcome.failure_count, 0);
    assert_eq!(outcome.page_count, 1);
    assert!(dark_pixels(&single_raster(&outcome.document)) > 100);

    let blank = export_model_text(fonts, "No Such Family", "").await;
    assert_eq!(dark_pixels(&single_raster(&blank.document)), 0);
}

#[tokio::test]
async fn test_ready_family_renders_without_fallback() {
    // Registered under a non-default family, so there is no fallback face
    let mut fonts = FontRegistry::new();
    fonts
        .register(FontKey::regular("DejaVu Sans"), DEJAVU_SANS.to_vec())
        .unwrap();
    assert!(fonts.default_face().is_none());

    let outcome = export_model_text(fonts.clone(), "DejaVu Sans", "ThinkPad X1").await;
    assert_eq!(outcome.failure_count, 0);
    assert!(dark_pixels(&single_raster(&outcome.document)) > 100);

    // Same text in an unknown family has nothing to draw with
    let skipped = export_model_text(fonts, "No Such Family", "ThinkPad X1").await;
    assert_eq!(skipped.failure_count, 0);
    assert_eq!(dark_pixels(&single_raster(&skipped.document)), 0);
}

#[tokio::test]
async fn test_pipeline_rejects_invalid_options() {
    let options = ExportOptions {
        layout: LayoutOptions {
            page_margin_pt: 1000.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let result = ExportPipeline::new(
        Arc::new(MemoryFetcher::default()),
        Arc::new(NeverReady),
        options,
    );
    assert!(matches!(result, Err(ComposeError::Config(_))));
}
