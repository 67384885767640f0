//! Shared test harness: the full service stack over in-memory backends.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use lopdf::{Document, Object, Stream, dictionary};

use markhub_core::config::export::ExportConfig;
use markhub_core::config::storage::StorageConfig;
use markhub_database::Repositories;
use markhub_entity::document::DocumentFile;
use markhub_render::RenderEngine;
use markhub_storage::StorageManager;

use crate::annotation::AnnotationService;
use crate::audit::AuditService;
use crate::context::RequestContext;
use crate::edit::EditService;
use crate::export::{ExportPipeline, ExportService};
use crate::file::FileService;
use crate::reset::ResetService;
use crate::version::VersionService;

/// Full service stack over in-memory repositories and blob storage.
pub(crate) struct TestHarness {
    pub files: FileService,
    pub versions: Arc<VersionService>,
    pub annotations: AnnotationService,
    pub audit: Arc<AuditService>,
    pub export: ExportService,
    pub reset: ResetService,
    pub edit: EditService,
}

impl TestHarness {
    pub(crate) async fn new() -> Self {
        let repos = Repositories::memory();
        let storage_config = StorageConfig {
            provider: "memory".to_string(),
            root: String::new(),
            max_upload_size_bytes: 50 * 1024 * 1024,
            allowed_extensions: ["pdf", "png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };
        let storage = Arc::new(
            StorageManager::new(&storage_config)
                .await
                .expect("memory storage init"),
        );
        let engine = RenderEngine::new(&ExportConfig::default());

        let audit = Arc::new(AuditService::new(Arc::clone(&repos.audit)));
        let versions = Arc::new(VersionService::new(
            Arc::clone(&repos.files),
            Arc::clone(&repos.versions),
            Arc::clone(&storage),
            Arc::clone(&audit),
        ));
        let files = FileService::new(
            Arc::clone(&repos.files),
            Arc::clone(&repos.versions),
            Arc::clone(&repos.annotations),
            Arc::clone(&storage),
            Arc::clone(&audit),
            storage_config,
        );
        let annotations = AnnotationService::new(
            Arc::clone(&repos.files),
            Arc::clone(&repos.annotations),
            Arc::clone(&audit),
        );
        let export = ExportService::new(
            Arc::clone(&repos.files),
            Arc::clone(&repos.versions),
            Arc::clone(&repos.annotations),
            Arc::clone(&storage),
            Arc::clone(&audit),
            ExportPipeline::new(engine),
        );
        let reset = ResetService::new(
            Arc::clone(&repos.files),
            Arc::clone(&repos.versions),
            Arc::clone(&repos.annotations),
            Arc::clone(&storage),
            Arc::clone(&versions),
        );
        let edit = EditService::new(Arc::clone(&repos.files), Arc::clone(&versions));

        Self {
            files,
            versions,
            annotations,
            audit,
            export,
            reset,
            edit,
        }
    }

    /// Upload a 16x16 white PNG under the given name.
    pub(crate) async fn upload_image(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> DocumentFile {
        let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([255, 255, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("encode fixture PNG");
        self.files
            .upload(ctx, name, Bytes::from(out.into_inner()))
            .await
            .expect("upload fixture image")
    }

    /// Upload an n-page Letter-sized PDF under the given name.
    pub(crate) async fn upload_pdf(
        &self,
        ctx: &RequestContext,
        name: &str,
        pages: usize,
    ) -> DocumentFile {
        self.files
            .upload(ctx, name, sample_pdf(pages))
            .await
            .expect("upload fixture PDF")
    }
}

/// Build an n-page PDF in memory.
pub(crate) fn sample_pdf(pages: usize) -> Bytes {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"q\nQ".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("build sample PDF");
    Bytes::from(out)
}
