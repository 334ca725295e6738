//! Export orchestration
//!
//! Turns a selection plus a store snapshot into one paginated PDF:
//! 1. Plan the pages from the instance categories
//! 2. Resolve font faces (bounded wait, default face on timeout)
//! 3. Fetch, decode and compose every instance concurrently
//! 4. Assemble and serialize the document
//!
//! Failures are contained to the instance or cell they happen in and
//! counted; an export never fails as a whole.

mod faces;

use crate::compositor::{FieldRender, compose_instance, decode_base, placeholder};
use crate::fetch::ImageFetcher;
use crate::fields::EffectiveField;
use crate::fonts::FontProvider;
use crate::layout::{PageDescriptor, plan_pages};
use crate::options::ExportOptions;
use crate::render::{assemble, serialize};
use crate::store::StoreSnapshot;
use crate::types::*;
use faces::FaceTable;
use image::RgbaImage;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// What an export produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Serialized PDF document
    pub document: Vec<u8>,
    /// Instances or cells that could not be rendered as intended
    pub failure_count: usize,
    pub page_count: usize,
}

/// Orchestrates compositing, layout and assembly for one or more exports
#[derive(Debug)]
pub struct ExportPipeline<F, P> {
    fetcher: Arc<F>,
    fonts: Arc<P>,
    options: ExportOptions,
}

impl<F, P> Clone for ExportPipeline<F, P> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            fonts: self.fonts.clone(),
            options: self.options.clone(),
        }
    }
}

impl<F: ImageFetcher, P: FontProvider> ExportPipeline<F, P> {
    /// Fails with `Config` if `options` do not validate
    pub fn new(fetcher: Arc<F>, fonts: Arc<P>, options: ExportOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            fetcher,
            fonts,
            options,
        })
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export every instance, in selection order.
    ///
    /// `instances` and `snapshot` must be taken before the caller awaits
    /// anything, so later edits cannot leak into the document.
    pub async fn export(
        &self,
        instances: &[TemplateInstance],
        snapshot: &StoreSnapshot,
    ) -> ExportOutcome {
        self.run(instances, snapshot, None).await
    }

    /// Export only the first `max_pages` pages.
    ///
    /// Instances that land on later pages are not fetched or composed.
    pub async fn preview(
        &self,
        instances: &[TemplateInstance],
        snapshot: &StoreSnapshot,
        max_pages: usize,
    ) -> ExportOutcome {
        self.run(instances, snapshot, Some(max_pages)).await
    }

    async fn run(
        &self,
        instances: &[TemplateInstance],
        snapshot: &StoreSnapshot,
        max_pages: Option<usize>,
    ) -> ExportOutcome {
        let categories: Vec<Category> = instances.iter().map(|i| i.category).collect();
        let mut pages = plan_pages(&categories, &self.options.layout);
        if let Some(max) = max_pages {
            pages.truncate(max);
        }
        let needed: BTreeSet<usize> = pages
            .iter()
            .flat_map(|page| page.cells.iter().filter_map(|cell| cell.slot))
            .collect();

        log::info!(
            "Exporting {} of {} instance(s) on {} page(s)",
            needed.len(),
            instances.len(),
            pages.len()
        );

        let fields: Vec<Vec<EffectiveField>> = instances
            .iter()
            .map(|instance| snapshot.effective_fields(instance))
            .collect();
        let fields_ref = &fields;
        let faces = FaceTable::resolve(
            &self.fonts,
            needed.iter().flat_map(move |&i| fields_ref[i].iter()),
            self.options.font_wait(),
        )
        .await;

        let (rasters, asset_failures) = self.compose_all(instances, &fields, &faces, &needed).await;

        let page_count = pages.len();
        let separator_width = self.options.layout.separator_width_pt;
        let finished = tokio::task::spawn_blocking(move || finish(&pages, &rasters, separator_width)).await;

        match finished {
            Ok(Ok((document, encoding_failures))) => {
                let failure_count = asset_failures + encoding_failures;
                log::info!(
                    "Export finished: {} page(s), {} failure(s)",
                    page_count,
                    failure_count
                );
                ExportOutcome {
                    document,
                    failure_count,
                    page_count,
                }
            }
            Ok(Err(e)) => failed_document(e, needed.len()),
            Err(e) => failed_document(ComposeError::TaskJoin(e), needed.len()),
        }
    }

    /// Compose the `needed` instances with at most `max_concurrency` in flight.
    ///
    /// Returns one raster per instance (empty for instances not needed) and
    /// the number of instances that had to use the placeholder.
    async fn compose_all(
        &self,
        instances: &[TemplateInstance],
        fields: &[Vec<EffectiveField>],
        faces: &FaceTable,
        needed: &BTreeSet<usize>,
    ) -> (Vec<RgbaImage>, usize) {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        let mut set = JoinSet::new();

        for &index in needed {
            let instance = instances[index].clone();
            let renders: Vec<FieldRender> = fields[index]
                .iter()
                .filter(|field| field.is_visible())
                .map(|field| FieldRender {
                    field: field.clone(),
                    face: faces.face_for(self.fonts.as_ref(), field),
                })
                .collect();
            let fetcher = self.fetcher.clone();
            let semaphore = semaphore.clone();

            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let composed = compose_one(fetcher.as_ref(), instance, renders).await;
                (index, composed)
            });
        }

        // Slots outside `needed` are never referenced by a page
        let mut rasters = vec![RgbaImage::new(0, 0); instances.len()];
        let mut failures = 0;
        let mut completed = BTreeSet::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, Ok((raster, asset_failed)))) => {
                    if asset_failed {
                        failures += 1;
                    }
                    rasters[index] = raster;
                    completed.insert(index);
                }
                Ok((index, Err(e))) => {
                    log::error!("Compositing instance {} failed: {}", instances[index].id, e);
                }
                Err(e) => log::error!("Compositing task failed: {}", e),
            }
        }

        // Anything that did not come back gets the placeholder and is counted
        for &index in needed.difference(&completed) {
            rasters[index] = placeholder(instances[index].category);
            failures += 1;
        }

        (rasters, failures)
    }
}

/// Fetch, decode and compose one instance.
///
/// The `bool` is true when the asset could not be used and the placeholder
/// was drawn instead.
async fn compose_one<F: ImageFetcher>(
    fetcher: &F,
    instance: TemplateInstance,
    renders: Vec<FieldRender>,
) -> Result<(RgbaImage, bool)> {
    let fetched = fetcher.fetch(&instance.asset.url).await;
    let category = instance.category;

    let composed = tokio::task::spawn_blocking(move || {
        let (base, asset_failed) = match fetched.and_then(|bytes| decode_base(&bytes, category)) {
            Ok(base) => (base, false),
            Err(e) => {
                log::warn!(
                    "Using placeholder for instance {} ({}): {}",
                    instance.id,
                    instance.asset.url,
                    e
                );
                (placeholder(category), true)
            }
        };
        (compose_instance(base, category, &renders), asset_failed)
    })
    .await?;

    Ok(composed)
}

fn finish(
    pages: &[PageDescriptor],
    rasters: &[RgbaImage],
    separator_width_pt: f32,
) -> Result<(Vec<u8>, usize)> {
    let assembled = assemble(pages, rasters, separator_width_pt);
    let bytes = serialize(assembled.document)?;
    Ok((bytes, assembled.encoding_failures))
}

/// The document could not be produced at all: every instance counts as failed
fn failed_document(error: ComposeError, instances: usize) -> ExportOutcome {
    log::error!("Failed to produce the export document: {}", error);
    ExportOutcome {
        document: Vec::new(),
        failure_count: instances,
        page_count: 0,
    }
}
