use image::ImageError;

use std::error::Error;
use std::fmt;
use std::io::Error as IOError;

#[derive(Debug)]
pub struct PlateError(PlateErrorKind);

#[derive(Debug)]
pub enum PlateErrorKind {
    IOError(IOError),
    ImageError(ImageError),
    /// The recognition engine could not be configured or failed on a crop.
    EngineError(String),
    #[cfg(feature = "tesseract")]
    DownloadError(Box<ureq::Error>),
}

impl PlateError {
    pub fn kind(&self) -> &PlateErrorKind {
        &self.0
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self(PlateErrorKind::EngineError(message.into()))
    }
}

impl<T> From<T> for PlateError
where T: Into<PlateErrorKind>
{
    fn from(e: T) -> Self {
        Self(e.into())
    }
}

impl fmt::Display for PlateError {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            PlateErrorKind::IOError(e) => e.fmt(f),
            PlateErrorKind::ImageError(e) => e.fmt(f),
            PlateErrorKind::EngineError(msg) => write!(f, "recognition engine error: {}", msg),
            #[cfg(feature = "tesseract")]
            PlateErrorKind::DownloadError(e) => {
                write!(f, "unable to download tesseract language data: {}", e)
            }
        }
    }
}

impl Error for PlateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.kind() {
            PlateErrorKind::IOError(e) => Some(e),
            PlateErrorKind::ImageError(e) => Some(e),
            PlateErrorKind::EngineError(_) => None,
            #[cfg(feature = "tesseract")]
            PlateErrorKind::DownloadError(e) => Some(e.as_ref()),
        }
    }
}

impl From<IOError> for PlateErrorKind {
    fn from(e: IOError) -> Self {
        Self::IOError(e)
    }
}

impl From<ImageError> for PlateErrorKind {
    fn from(e: ImageError) -> Self {
        Self::ImageError(e)
    }
}

#[cfg(feature = "tesseract")]
impl From<ureq::Error> for PlateErrorKind {
    fn from(e: ureq::Error) -> Self {
        Self::DownloadError(Box::new(e))
    }
}
