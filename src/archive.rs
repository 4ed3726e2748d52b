//! Archive packaging for multi-file conversion outputs.
//!
//! Split pages and rasterized page sets come back as many files; the response
//! is a single zip. Entries are appended one at a time as the producer yields
//! them, so a hundred-page split never holds more than one page in memory.
//! The archive itself is written into the request's scratch space and
//! streamed from disk by the HTTP layer — an error while producing *any*
//! entry aborts the write before a single response byte is sent, so the
//! client sees an explicit JSON error instead of a truncated archive that
//! superficially looks valid.
//!
//! Compression is fixed at maximum deflate; conversion outputs are one-shot
//! downloads where size beats CPU.

use crate::error::ConvertError;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One named payload inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

fn options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9))
}

/// Append lazily-produced entries to a zip written into `writer`.
///
/// The iterator may yield `Err` mid-stream (e.g. a page failed to extract);
/// the archive write aborts immediately and the error propagates. Blocking —
/// call from `spawn_blocking`.
pub fn write_archive<W, I>(writer: W, entries: I) -> Result<(), ConvertError>
where
    W: Write + Seek,
    I: IntoIterator<Item = Result<ArchiveEntry, ConvertError>>,
{
    let mut zip = ZipWriter::new(writer);
    for entry in entries {
        let entry = entry?;
        zip.start_file(entry.name.as_str(), options())
            .map_err(|e| ConvertError::Infrastructure(format!("archive write: {e}")))?;
        zip.write_all(&entry.bytes)
            .map_err(|e| ConvertError::Infrastructure(format!("archive write: {e}")))?;
    }
    zip.finish()
        .map_err(|e| ConvertError::Infrastructure(format!("archive finish: {e}")))?;
    Ok(())
}

/// [`write_archive`] into a file at `path`. Blocking — call from
/// `spawn_blocking`.
pub fn write_archive_file<I>(path: &Path, entries: I) -> Result<(), ConvertError>
where
    I: IntoIterator<Item = Result<ArchiveEntry, ConvertError>>,
{
    let file = std::fs::File::create(path)
        .map_err(|e| ConvertError::Infrastructure(format!("archive create: {e}")))?;
    write_archive(file, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn unpack(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
        let mut out = Vec::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).unwrap();
            out.push((file.name().to_string(), buf));
        }
        out
    }

    fn pack(entries: Vec<ArchiveEntry>) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        write_archive(&mut cursor, entries.into_iter().map(Ok)).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn round_trip_empty_archive() {
        let bytes = pack(vec![]);
        assert!(unpack(&bytes).is_empty());
    }

    #[test]
    fn round_trip_single_entry() {
        let bytes = pack(vec![ArchiveEntry::new("page-1.pdf", b"%PDF-1.5".to_vec())]);
        let entries = unpack(&bytes);
        assert_eq!(entries, vec![("page-1.pdf".to_string(), b"%PDF-1.5".to_vec())]);
    }

    #[test]
    fn round_trip_preserves_order_and_bytes() {
        let input = vec![
            ArchiveEntry::new("page-1.jpg", vec![1, 2, 3]),
            ArchiveEntry::new("page-2.jpg", vec![4, 5]),
            ArchiveEntry::new("page-3.jpg", vec![]),
        ];
        let entries = unpack(&pack(input.clone()));
        assert_eq!(entries.len(), 3);
        for (got, want) in entries.iter().zip(&input) {
            assert_eq!(got.0, want.name);
            assert_eq!(got.1, want.bytes);
        }
    }

    #[test]
    fn entry_error_aborts_the_archive() {
        let entries: Vec<Result<ArchiveEntry, ConvertError>> = vec![
            Ok(ArchiveEntry::new("page-1.pdf", vec![1])),
            Err(ConvertError::codec("page 2 unreadable")),
        ];
        let mut cursor = Cursor::new(Vec::new());
        let err = write_archive(&mut cursor, entries).unwrap_err();
        assert!(err.to_string().contains("page 2 unreadable"));
    }

    #[test]
    fn write_archive_file_creates_readable_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.zip");
        write_archive_file(
            &path,
            vec![Ok(ArchiveEntry::new("a.txt", b"hello".to_vec()))],
        )
        .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(unpack(&bytes), vec![("a.txt".to_string(), b"hello".to_vec())]);
    }
}
