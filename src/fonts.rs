//! Chart font registration.
//!
//! Plotters renders glyphs with `ab_glyph`, which has no font discovery of
//! its own: a TrueType file must be registered under the family name the
//! chart asks for (`sans-serif`). The first candidate that parses as a font
//! wins; its bytes live for the rest of the process.

use ab_glyph::FontRef;
use lazy_static::lazy_static;
use log::{debug, warn};
use plotters::style::{FontStyle, register_font};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const FAMILY: &str = "sans-serif";

const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

lazy_static! {
    // Outer None: no lookup yet. Inner None: lookup ran and found nothing.
    static ref REGISTERED: Mutex<Option<Option<PathBuf>>> = Mutex::new(None);
}

/// Register a font for chart text, trying `preferred` before the built-in
/// candidate list. The lookup runs once per process; returns the registered
/// file.
pub fn ensure_registered(preferred: Option<&Path>) -> Option<PathBuf> {
    let mut registered = REGISTERED.lock().unwrap_or_else(|e| e.into_inner());
    registered
        .get_or_insert_with(|| {
            let candidates = preferred
                .into_iter()
                .map(Path::to_path_buf)
                .chain(CANDIDATES.iter().map(PathBuf::from));
            for path in candidates {
                if try_register(&path) {
                    debug!("chart font: {}", path.display());
                    return Some(path);
                }
            }
            warn!("no TrueType font found; charts will be drawn without text");
            None
        })
        .clone()
}

fn try_register(path: &Path) -> bool {
    let Ok(bytes) = std::fs::read(path) else {
        return false;
    };
    if let Err(e) = FontRef::try_from_slice(&bytes) {
        warn!("unusable font {}: {}", path.display(), e);
        return false;
    }

    // register_font keeps a reference for the process lifetime
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    if register_font(FAMILY, FontStyle::Normal, bytes).is_err() {
        warn!("plotters rejected font {}", path.display());
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_font_files_are_not_registered() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"definitely not a font").unwrap();
        assert!(!try_register(file.path()));
        assert!(!try_register(Path::new("/no/such/font.ttf")));
    }
}
