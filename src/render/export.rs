use std::path::{Path, PathBuf};

use serde::Serialize;

/// Image encodings the renderer can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportFormat {
    Png,
    Svg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "svg" => Some(ExportFormat::Svg),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    /// Pick the encoding from the file extension. Missing or unknown
    /// extensions get ".png" appended.
    pub fn for_path(path: &Path) -> (Self, PathBuf) {
        let known = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension);

        match known {
            Some(format) => (format, path.to_path_buf()),
            None => {
                let format = ExportFormat::Png;
                let mut name = path.as_os_str().to_os_string();
                name.push(".");
                name.push(format.extension());
                (format, PathBuf::from(name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_known_extensions() {
        assert_eq!(
            ExportFormat::for_path(Path::new("out/graph.SVG")),
            (ExportFormat::Svg, PathBuf::from("out/graph.SVG"))
        );
        let (format, path) = ExportFormat::for_path(Path::new("g.pdf"));
        assert_eq!(format, ExportFormat::Pdf);
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some(format.extension()));
    }

    #[test]
    fn defaults_to_png() {
        assert_eq!(
            ExportFormat::for_path(Path::new("graph")),
            (ExportFormat::Png, PathBuf::from("graph.png"))
        );
        assert_eq!(
            ExportFormat::for_path(Path::new("graph.jpg")).1,
            PathBuf::from("graph.jpg.png")
        );
    }
}
