use crate::catalog::types::CatalogError;
use image::ImageFormat;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk side store for cover images: one JPEG per book, named `<id>.jpg`, no
/// subdirectories. A missing file simply means the book has no cover; every reader
/// tolerates that.
pub struct CoverStore {
    dir: PathBuf,
}

impl CoverStore {
    #[must_use]
    #[inline]
    pub(crate) const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub(crate) fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    #[must_use]
    #[inline]
    pub fn path_for(&self, id: i64) -> PathBuf {
        self.dir.join(format!("{id}.jpg"))
    }

    #[must_use]
    #[inline]
    pub fn exists(&self, id: i64) -> bool {
        self.path_for(id).is_file()
    }

    #[must_use]
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode `bytes` as an image (any supported upload format) and re-encode it as the
    /// fixed on-disk JPEG for `id`. Alpha is dropped, JPEG has no use for it.
    pub fn save(&self, id: i64, bytes: &[u8]) -> Result<(), CatalogError> {
        let decoded = image::load_from_memory(bytes).map_err(CatalogError::ImageDecode)?;
        decoded
            .to_rgb8()
            .save_with_format(self.path_for(id), ImageFormat::Jpeg)
            .map_err(CatalogError::CoverWrite)?;
        Ok(())
    }

    /// Remove the cover for `id` if one exists. Idempotent: removing a cover that is not
    /// there is not an error.
    pub fn remove(&self, id: i64) -> Result<(), CatalogError> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(CatalogError::Io(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use std::io::Cursor;

    fn scratch_store() -> (CoverStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverStore::new(dir.path().join("covers"));
        store.ensure().unwrap();
        (store, dir)
    }

    fn png_bytes() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30])));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn save_reencodes_png_upload_as_jpeg() {
        let (store, _dir) = scratch_store();

        store.save(7, &png_bytes()).unwrap();

        assert!(store.exists(7));
        let written = image::open(store.path_for(7)).unwrap();
        assert_eq!(written.width(), 4);
        assert_eq!(written.height(), 4);
    }

    #[test]
    fn save_rejects_undecodable_bytes() {
        let (store, _dir) = scratch_store();

        let result = store.save(1, b"not an image at all");

        assert!(matches!(result, Err(CatalogError::ImageDecode(_))));
        assert!(!store.exists(1));
    }

    #[test]
    fn remove_is_idempotent() {
        let (store, _dir) = scratch_store();
        store.save(3, &png_bytes()).unwrap();

        store.remove(3).unwrap();
        assert!(!store.exists(3));

        // A second removal, or removing an id that never had a cover, is fine too.
        store.remove(3).unwrap();
        store.remove(999).unwrap();
    }
}
