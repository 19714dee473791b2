use std::path::PathBuf;

use tesseract::Tesseract;

use crate::document::domain::text_recognizer::TextRecognizer;
use crate::shared::frame::Frame;

/// Tesseract-backed text recognizer.
///
/// The engine is created once and reused across images; if feeding an
/// image fails the engine is dropped and rebuilt on the next call.
pub struct TesseractRecognizer {
    datapath: Option<String>,
    language: String,
    engine: Option<Tesseract>,
}

// The engine handle is only ever used from the thread that owns the recognizer.
unsafe impl Send for TesseractRecognizer {}

impl TesseractRecognizer {
    pub fn new(
        tessdata_dir: Option<PathBuf>,
        language: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let datapath = match tessdata_dir {
            Some(dir) => Some(
                dir.to_str()
                    .ok_or_else(|| format!("tessdata path {} is not valid UTF-8", dir.display()))?
                    .to_string(),
            ),
            None => None,
        };
        let engine = Tesseract::new(datapath.as_deref(), Some(language))?;
        log::debug!("Tesseract initialised for language {language}");
        Ok(Self {
            datapath,
            language: language.to_string(),
            engine: Some(engine),
        })
    }

    fn take_engine(&mut self) -> Result<Tesseract, Box<dyn std::error::Error>> {
        match self.engine.take() {
            Some(engine) => Ok(engine),
            None => Ok(Tesseract::new(
                self.datapath.as_deref(),
                Some(&self.language),
            )?),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&mut self, image: &Frame) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let bytes_per_pixel = image.channels() as i32;
        let mut engine = self.take_engine()?.set_frame(
            image.data(),
            image.width() as i32,
            image.height() as i32,
            bytes_per_pixel,
            image.width() as i32 * bytes_per_pixel,
        )?;
        let text = engine.get_text()?;
        self.engine = Some(engine);

        Ok(split_fragments(&text))
    }
}

/// One fragment per non-empty line, trimmed.
fn split_fragments(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
