use image::GrayImage;

use crate::error::PlateError;

/// Text recognition capability consumed by the search pipeline.
///
/// Implementations receive a normalized, noise-filtered, single-channel
/// crop and return the recognized text, possibly empty. Engines that need
/// setup must fail at construction, before any image is processed.
pub trait OcrEngine {
    fn recognize(&mut self, image: &GrayImage) -> Result<String, PlateError>;
}

#[cfg(feature = "tesseract")]
pub use self::tesseract::TesseractOcr;

#[cfg(feature = "tesseract")]
mod tesseract {
    use image::GrayImage;
    use leptess::{LepTess, Variable};
    use tracing::info;

    use std::fs;
    use std::io::Cursor;
    use std::path::Path;

    use super::OcrEngine;
    use crate::error::PlateError;

    /// Characters a plate may contain; everything else is ruled out up front.
    const CHAR_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ-.1234567890";
    const TESSDATA_URL: &str = "https://raw.githubusercontent.com/tesseract-ocr/tessdata/main";

    /// Tesseract-backed recognition engine.
    pub struct TesseractOcr {
        engine: LepTess,
    }

    impl TesseractOcr {
        /// Set up tesseract with `lang` data under `data_path`, fetching the
        /// language files on first use.
        pub fn new(data_path: impl AsRef<Path>, lang: &str) -> Result<Self, PlateError> {
            let data_path = data_path.as_ref();
            download_lang_file(data_path, lang)?;
            // script orientation detection data
            download_lang_file(data_path, "osd")?;

            let mut engine = LepTess::new(data_path.to_str(), lang)
                .map_err(|e| PlateError::engine(format!("tesseract init failed: {}", e)))?;
            engine
                .set_variable(Variable::TesseditCharWhitelist, CHAR_WHITELIST)
                .map_err(|e| PlateError::engine(format!("tesseract variable rejected: {}", e)))?;
            Ok(Self { engine })
        }
    }

    impl OcrEngine for TesseractOcr {
        fn recognize(&mut self, image: &GrayImage) -> Result<String, PlateError> {
            let mut png = Vec::new();
            image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
            self.engine
                .set_image_from_mem(&png)
                .map_err(|e| PlateError::engine(format!("tesseract rejected image: {}", e)))?;
            let text = self
                .engine
                .get_utf8_text()
                .map_err(|e| PlateError::engine(format!("tesseract recognition failed: {}", e)))?;
            Ok(text.trim().to_string())
        }
    }

    /// Fetch `{lang}.traineddata` into `folder` unless it is already there.
    fn download_lang_file(folder: &Path, lang: &str) -> Result<(), PlateError> {
        fs::create_dir_all(folder)?;
        let dest = folder.join(format!("{}.traineddata", lang));
        if dest.exists() {
            return Ok(());
        }
        let url = format!("{}/{}.traineddata", TESSDATA_URL, lang);
        info!(%url, "downloading tesseract language data");
        let response = ureq::get(&url).call()?;
        let mut reader = response.into_reader();
        let mut file = fs::File::create(&dest)?;
        std::io::copy(&mut reader, &mut file)?;
        Ok(())
    }
}
