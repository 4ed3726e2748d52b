//! Conversion orchestration.
//!
//! Every flow follows the same sequence: validate, acquire a scratch space if
//! anything touches disk, stage input, run a codec (inside `spawn_blocking`)
//! or an external tool, collect the output. In-process flows never touch the
//! filesystem at all; tool flows always work inside a [`ScratchSpace`] whose
//! path doubles as the subprocess working directory, so tool argument lists
//! can use bare conventional file names (`input.pdf`, `output.pdf`).
//!
//! Single-document results come back as bytes with their fixed download name
//! attached. Multi-file results are zipped *into the scratch space* and the
//! space travels with the result, keeping the archive alive until the HTTP
//! layer finishes streaming it.

use crate::archive::{self, ArchiveEntry};
use crate::codec::raster::{self, RasterFormat};
use crate::codec::{pdf, svg};
use crate::config::{Dimensions, ToolConfig};
use crate::error::ConvertError;
use crate::invoke;
use crate::scratch::ScratchSpace;
use std::path::PathBuf;
use tracing::{debug, info};

// ── Fixed download names ─────────────────────────────────────────────────

pub const PNG_NAME: &str = "converted.png";
pub const JPG_NAME: &str = "converted.jpg";
pub const PDF_NAME: &str = "converted.pdf";
pub const DOCX_NAME: &str = "converted.docx";
pub const COMPRESSED_JPG_NAME: &str = "compressed.jpg";
pub const COMPRESSED_PDF_NAME: &str = "compressed.pdf";
pub const IMAGE_PDF_NAME: &str = "image.pdf";
pub const SPLIT_ARCHIVE_NAME: &str = "split-pages.zip";
pub const PAGES_ARCHIVE_NAME: &str = "pdf-pages.zip";

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";
pub const PDF_MIME: &str = "application/pdf";
pub const ZIP_MIME: &str = "application/zip";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The outcome of a conversion flow, ready for the HTTP layer.
#[derive(Debug)]
pub enum Converted {
    /// A single document, fully materialized in memory.
    Single {
        filename: &'static str,
        content_type: &'static str,
        bytes: Vec<u8>,
    },
    /// A zip archive written into `space`; the space must stay alive until
    /// the file at `path` has been streamed out.
    Archive {
        filename: &'static str,
        space: ScratchSpace,
        path: PathBuf,
    },
}

async fn blocking<T, F>(f: F) -> Result<T, ConvertError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ConvertError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ConvertError::Infrastructure(format!("blocking task: {e}")))?
}

// ── In-process raster flows ──────────────────────────────────────────────

/// Re-encode any supported raster payload as PNG.
pub async fn image_to_png(input: Vec<u8>) -> Result<Converted, ConvertError> {
    let bytes = blocking(move || raster::reencode(&input, RasterFormat::Png)).await?;
    Ok(Converted::Single {
        filename: PNG_NAME,
        content_type: PNG_MIME,
        bytes,
    })
}

/// Re-encode any supported raster payload as JPEG at `quality`.
pub async fn image_to_jpeg(input: Vec<u8>, quality: u8) -> Result<Converted, ConvertError> {
    let bytes = blocking(move || raster::reencode(&input, RasterFormat::Jpeg { quality })).await?;
    Ok(Converted::Single {
        filename: JPG_NAME,
        content_type: JPEG_MIME,
        bytes,
    })
}

/// Lossy size reduction: decode and re-encode as JPEG at `quality`.
pub async fn compress_image(input: Vec<u8>, quality: u8) -> Result<Converted, ConvertError> {
    let bytes = blocking(move || raster::reencode(&input, RasterFormat::Jpeg { quality })).await?;
    Ok(Converted::Single {
        filename: COMPRESSED_JPG_NAME,
        content_type: JPEG_MIME,
        bytes,
    })
}

// ── SVG flows ────────────────────────────────────────────────────────────

/// Rasterize an SVG to PNG, fit inside `dims`.
pub async fn svg_to_png(input: Vec<u8>, dims: Dimensions) -> Result<Converted, ConvertError> {
    let bytes = blocking(move || {
        let img = svg::rasterize(&input, dims)?;
        raster::encode(&img, RasterFormat::Png)
    })
    .await?;
    Ok(Converted::Single {
        filename: PNG_NAME,
        content_type: PNG_MIME,
        bytes,
    })
}

/// Rasterize an SVG to JPEG at `quality`, fit inside `dims`.
pub async fn svg_to_jpeg(
    input: Vec<u8>,
    dims: Dimensions,
    quality: u8,
) -> Result<Converted, ConvertError> {
    let bytes = blocking(move || {
        let img = svg::rasterize(&input, dims)?;
        raster::encode(&img, RasterFormat::Jpeg { quality })
    })
    .await?;
    Ok(Converted::Single {
        filename: JPG_NAME,
        content_type: JPEG_MIME,
        bytes,
    })
}

/// Rasterize an SVG and wrap the render in a one-page PDF.
pub async fn svg_to_pdf(
    input: Vec<u8>,
    dims: Dimensions,
    quality: u8,
) -> Result<Converted, ConvertError> {
    let bytes = blocking(move || {
        let img = svg::rasterize(&input, dims)?;
        let jpeg = raster::encode(&img, RasterFormat::Jpeg { quality })?;
        pdf::compose_jpeg_pdf(&jpeg)
    })
    .await?;
    Ok(Converted::Single {
        filename: PDF_NAME,
        content_type: PDF_MIME,
        bytes,
    })
}

// ── PDF flows ────────────────────────────────────────────────────────────

/// Default quality when a non-JPEG raster has to be transcoded before PDF
/// embedding.
const EMBED_JPEG_QUALITY: u8 = 90;

/// Wrap a raster image in a one-page PDF at its native pixel size.
///
/// Grayscale and three-component JPEG inputs are embedded verbatim;
/// everything else (other formats, CMYK JPEGs) is transcoded to JPEG first,
/// since the page embeds a `DCTDecode` stream.
pub async fn image_to_pdf(input: Vec<u8>) -> Result<Converted, ConvertError> {
    let bytes = blocking(move || {
        let jpeg = if pdf::embeddable_jpeg(&input) {
            input
        } else {
            raster::reencode(&input, RasterFormat::Jpeg {
                quality: EMBED_JPEG_QUALITY,
            })?
        };
        pdf::compose_jpeg_pdf(&jpeg)
    })
    .await?;
    Ok(Converted::Single {
        filename: IMAGE_PDF_NAME,
        content_type: PDF_MIME,
        bytes,
    })
}

/// Split a PDF into one standalone document per page, zipped as
/// `page-1.pdf`, `page-2.pdf`, …
pub async fn split_pdf(input: Vec<u8>) -> Result<Converted, ConvertError> {
    let space = ScratchSpace::acquire()?;
    let path = space.path().join(SPLIT_ARCHIVE_NAME);
    let archive_path = path.clone();

    blocking(move || {
        let doc = pdf::load(&input)?;
        let count = pdf::page_count(&doc);
        if count == 0 {
            return Err(ConvertError::codec("PDF has no pages"));
        }
        info!(pages = count, "splitting PDF");
        let entries = (1..=count as u32).map(|page| {
            pdf::extract_page(&doc, page)
                .map(|bytes| ArchiveEntry::new(format!("page-{page}.pdf"), bytes))
        });
        archive::write_archive_file(&archive_path, entries)
    })
    .await?;

    Ok(Converted::Archive {
        filename: SPLIT_ARCHIVE_NAME,
        space,
        path,
    })
}

/// Rasterization resolution for PDF page renders, in DPI.
const PAGE_RENDER_DPI: &str = "150";

/// Render every PDF page to JPEG via `pdftoppm` and zip the pages as
/// `page-1.jpg`, `page-2.jpg`, …
pub async fn pdf_to_images(
    input: Vec<u8>,
    tools: &ToolConfig,
) -> Result<Converted, ConvertError> {
    let space = ScratchSpace::acquire()?;
    space.stage("input.pdf", &input).await?;

    let args: Vec<String> = ["-jpeg", "-r", PAGE_RENDER_DPI, "input.pdf", "page"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    invoke::run(&tools.pdftoppm, &args, space.path()).await?;

    // pdftoppm zero-pads page numbers to a uniform width, so a plain
    // name sort is already page order.
    let rendered = space.list_ext("jpg").await?;
    if rendered.is_empty() {
        return Err(ConvertError::OutputMissing {
            tool: primary(&tools.pdftoppm),
            expected: "jpg".into(),
        });
    }

    let mut entries = Vec::with_capacity(rendered.len());
    for (i, page) in rendered.iter().enumerate() {
        let bytes = space.read(page).await?;
        entries.push(ArchiveEntry::new(format!("page-{}.jpg", i + 1), bytes));
    }

    let path = space.path().join(PAGES_ARCHIVE_NAME);
    let archive_path = path.clone();
    blocking(move || archive::write_archive_file(&archive_path, entries.into_iter().map(Ok)))
        .await?;

    Ok(Converted::Archive {
        filename: PAGES_ARCHIVE_NAME,
        space,
        path,
    })
}

/// Convert a PDF to Word via LibreOffice.
pub async fn pdf_to_word(input: Vec<u8>, tools: &ToolConfig) -> Result<Converted, ConvertError> {
    let bytes = soffice_convert(
        input,
        "input.pdf",
        &["docx:MS Word 2007 XML", "docx"],
        "docx",
        tools,
    )
    .await?;
    Ok(Converted::Single {
        filename: DOCX_NAME,
        content_type: DOCX_MIME,
        bytes,
    })
}

/// Convert a Word document to PDF via LibreOffice.
pub async fn word_to_pdf(input: Vec<u8>, tools: &ToolConfig) -> Result<Converted, ConvertError> {
    let bytes = soffice_convert(
        input,
        "input.docx",
        &["pdf:writer_pdf_Export", "pdf"],
        "pdf",
        tools,
    )
    .await?;
    Ok(Converted::Single {
        filename: PDF_NAME,
        content_type: PDF_MIME,
        bytes,
    })
}

/// Shrink a PDF with Ghostscript's `/ebook` preset.
pub async fn compress_pdf(input: Vec<u8>, tools: &ToolConfig) -> Result<Converted, ConvertError> {
    let space = ScratchSpace::acquire()?;
    space.stage("input.pdf", &input).await?;

    let args: Vec<String> = [
        "-sDEVICE=pdfwrite",
        "-dCompatibilityLevel=1.4",
        "-dPDFSETTINGS=/ebook",
        "-dNOPAUSE",
        "-dQUIET",
        "-dBATCH",
        "-sOutputFile=output.pdf",
        "input.pdf",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    invoke::run(&tools.ghostscript, &args, space.path()).await?;

    let out = space.path().join("output.pdf");
    if !out.exists() {
        return Err(ConvertError::OutputMissing {
            tool: primary(&tools.ghostscript),
            expected: "pdf".into(),
        });
    }
    let bytes = space.read(&out).await?;
    Ok(Converted::Single {
        filename: COMPRESSED_PDF_NAME,
        content_type: PDF_MIME,
        bytes,
    })
}

// ── LibreOffice cascade ──────────────────────────────────────────────────

/// Run LibreOffice `--convert-to` with a filter cascade.
///
/// Named export filters vary across LibreOffice versions, so each filter in
/// `filters` is tried in turn (explicit filter first, bare extension last),
/// and when every run finishes without the conventionally-named output file
/// appearing, the scratch directory is scanned for *any* file with the target
/// extension. Only when all of that comes up empty does the flow fail — with
/// the last launch error if there was one, otherwise as missing output.
async fn soffice_convert(
    input: Vec<u8>,
    input_name: &str,
    filters: &[&str],
    out_ext: &str,
    tools: &ToolConfig,
) -> Result<Vec<u8>, ConvertError> {
    let space = ScratchSpace::acquire()?;
    space.stage(input_name, &input).await?;

    // soffice names its output after the input stem.
    let stem = input_name.rsplit_once('.').map(|(s, _)| s).unwrap_or(input_name);
    let expected = space.path().join(format!("{stem}.{out_ext}"));

    let mut last_err = None;
    for filter in filters {
        let args: Vec<String> = [
            "--headless",
            "--convert-to",
            filter,
            "--outdir",
            ".",
            input_name,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        match invoke::run(&tools.libreoffice, &args, space.path()).await {
            Ok(()) if expected.exists() => {
                debug!(filter, "LibreOffice produced expected output");
                return space.read(&expected).await;
            }
            Ok(()) => {
                debug!(filter, "LibreOffice exited zero without expected output");
            }
            Err(e) => {
                last_err = Some(e);
            }
        }
    }

    // Last resort: some builds pick a different output stem.
    if let Some(found) = space.list_ext(out_ext).await?.into_iter().next() {
        debug!(path = %found.display(), "falling back to scanned output");
        return space.read(&found).await;
    }

    Err(match last_err {
        Some(e) => e,
        None => ConvertError::OutputMissing {
            tool: primary(&tools.libreoffice),
            expected: out_ext.to_string(),
        },
    })
}

fn primary(candidates: &[String]) -> String {
    candidates.first().cloned().unwrap_or_default()
}
