//! Filesystem access for images and their annotation files.
//!
//! Each image `photo.jpg` has its boxes in a sibling `photo.txt`. The editing
//! engine never touches the disk; everything here reads or writes lines and
//! hands them to an [`AnnotationSession`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::constants::{ANNOTATION_EXTENSION, IMAGE_EXTENSIONS};
use crate::format::{FormatError, FormatWarning};
use crate::model::ImageSize;
use crate::session::{AnnotationSession, SessionSettings};

/// Check if a path has a supported image extension (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Path of the annotation file belonging to an image.
pub fn annotation_path_for(image: &Path) -> PathBuf {
    image.with_extension(ANNOTATION_EXTENSION)
}

/// Image files directly inside `dir`, sorted by path.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, FormatError> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();

    // Sort by filename for consistent ordering
    images.sort();
    log::debug!("Found {} images in {:?}", images.len(), dir);
    Ok(images)
}

/// Read annotation lines. A missing file is an image with no boxes yet.
pub fn read_annotation_lines(path: &Path) -> Result<Vec<String>, FormatError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().map(String::from).collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No annotation file at {:?}", path);
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Write annotation lines, newline separated without a trailing newline.
pub fn write_annotation_lines(path: &Path, lines: &[String]) -> Result<(), FormatError> {
    std::fs::write(path, lines.join("\n"))?;
    log::debug!("Wrote {} lines to {:?}", lines.len(), path);
    Ok(())
}

/// Image dimensions from the file header, without decoding pixels.
pub fn image_dimensions(path: &Path) -> Result<ImageSize, FormatError> {
    let (width, height) = image::image_dimensions(path)?;
    Ok(ImageSize::from_pixels(width, height)?)
}

/// Open a session for an image, loading its annotation file if present.
pub fn open_session(
    image: &Path,
    settings: SessionSettings,
) -> Result<(AnnotationSession, Vec<FormatWarning>), FormatError> {
    let size = image_dimensions(image)?;
    let lines = read_annotation_lines(&annotation_path_for(image))?;

    let mut session = AnnotationSession::new(size, settings)?;
    let warnings = session.load(&lines);
    log::info!("Opened {:?} with {} boxes", image, session.document().len());
    Ok((session, warnings))
}

/// Write a session's boxes next to its image.
pub fn save_session(session: &mut AnnotationSession, image: &Path) -> Result<(), FormatError> {
    let lines = session.save()?;
    write_annotation_lines(&annotation_path_for(image), &lines)
}

/// Ordered images of one folder with a cursor for the open image.
#[derive(Clone, Debug)]
pub struct ImageFolder {
    /// Path to the folder
    pub folder: PathBuf,
    /// Image files in the folder, sorted
    images: Vec<PathBuf>,
    /// Current image index
    current_index: usize,
}

impl ImageFolder {
    /// Discover image files in a folder, non-recursively.
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self, FormatError> {
        let folder = folder.into();
        let images = list_images(&folder)?;
        log::info!("Opened folder {:?}: {} images", folder, images.len());
        Ok(Self {
            folder,
            images,
            current_index: 0,
        })
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Get the current image path.
    pub fn current(&self) -> Option<&Path> {
        self.images.get(self.current_index).map(PathBuf::as_path)
    }

    /// Jump to an image. Returns `false` if the index is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.images.len() {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    /// Move to the next image, wrapping around.
    pub fn next(&mut self) {
        if !self.images.is_empty() {
            self.current_index = (self.current_index + 1) % self.images.len();
        }
    }

    /// Move to the previous image, wrapping around.
    pub fn prev(&mut self) {
        if !self.images.is_empty() {
            self.current_index = if self.current_index == 0 {
                self.images.len() - 1
            } else {
                self.current_index - 1
            };
        }
    }

    /// Get progress string like "3/15".
    pub fn progress(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.images.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PointerEvent;

    /// Scratch directory removed on drop.
    struct TempDir(PathBuf);

    impl TempDir {
        fn new(name: &str) -> Self {
            let path =
                std::env::temp_dir().join(format!("boxtag-{}-{}", name, std::process::id()));
            let _ = std::fs::remove_dir_all(&path);
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }

        fn write_image(&self, name: &str, width: u32, height: u32) -> PathBuf {
            let path = self.0.join(name);
            image::RgbImage::new(width, height).save(&path).unwrap();
            path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_annotation_path_for() {
        assert_eq!(
            annotation_path_for(Path::new("data/photo.JPG")),
            PathBuf::from("data/photo.txt")
        );
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a.png")));
        assert!(is_image_file(Path::new("a.JPEG")));
        assert!(is_image_file(Path::new("dir/a.bmp")));
        assert!(!is_image_file(Path::new("a.txt")));
        assert!(!is_image_file(Path::new("png")));
    }

    #[test]
    fn test_list_images_sorted_and_filtered() {
        let dir = TempDir::new("list");
        dir.write_image("b.png", 2, 2);
        dir.write_image("a.png", 2, 2);
        std::fs::write(dir.0.join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.0.join("sub.png")).unwrap();

        let images = list_images(&dir.0).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_missing_annotation_file_is_empty() {
        let dir = TempDir::new("missing");
        let lines = read_annotation_lines(&dir.0.join("nothing.txt")).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_write_has_no_trailing_newline() {
        let dir = TempDir::new("write");
        let path = dir.0.join("a.txt");
        let lines = vec!["a 0.5 0.5 0.1 0.1".to_string(), "b 0.5 0.5 0.2 0.2".to_string()];

        write_annotation_lines(&path, &lines).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "a 0.5 0.5 0.1 0.1\nb 0.5 0.5 0.2 0.2"
        );
        assert_eq!(read_annotation_lines(&path).unwrap(), lines);
    }

    #[test]
    fn test_open_edit_save_reopen() {
        let dir = TempDir::new("session");
        let image = dir.write_image("scene.png", 200, 100);

        let (mut session, warnings) = open_session(&image, SessionSettings::default()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(session.image(), ImageSize::new(200.0, 100.0).unwrap());

        session.pointer(PointerEvent::down(20.0, 20.0)).unwrap();
        session.pointer(PointerEvent::moved(60.0, 40.0)).unwrap();
        session.pointer(PointerEvent::up(60.0, 40.0)).unwrap();
        save_session(&mut session, &image).unwrap();

        let saved = std::fs::read_to_string(dir.0.join("scene.txt")).unwrap();
        assert_eq!(saved, "Object 0.200000 0.300000 0.200000 0.200000");

        let (reopened, _) = open_session(&image, SessionSettings::default()).unwrap();
        assert_eq!(reopened.document().len(), 1);
    }

    #[test]
    fn test_image_folder_navigation() {
        let dir = TempDir::new("folder");
        for name in ["c.png", "a.png", "b.png"] {
            dir.write_image(name, 1, 1);
        }

        let mut folder = ImageFolder::open(&dir.0).unwrap();
        assert_eq!(folder.len(), 3);
        assert!(folder.current().unwrap().ends_with("a.png"));

        folder.prev();
        assert!(folder.current().unwrap().ends_with("c.png"));
        folder.next();
        folder.next();
        assert!(folder.current().unwrap().ends_with("b.png"));
        assert_eq!(folder.progress(), "2/3");

        assert!(folder.select(2));
        assert!(!folder.select(3));
        assert_eq!(folder.current_index(), 2);
        folder.next();
        assert!(folder.current().unwrap().ends_with("a.png"));
    }

    #[test]
    fn test_empty_folder() {
        let dir = TempDir::new("empty");
        let mut folder = ImageFolder::open(&dir.0).unwrap();
        assert!(folder.is_empty());
        folder.next();
        folder.prev();
        assert!(folder.current().is_none());
    }
}
