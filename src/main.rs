use clap::{App, Arg};
use tracing_subscriber::EnvFilter;

use std::error::Error;

use plate_detect::ocr::TesseractOcr;
use plate_detect::{annotate, LicensePlateDetector, SessionState};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = App::new("plate-detect")
        .version("0.1.0")
        .about("Finds license plates in a photo and reads them with tesseract")
        .arg(Arg::with_name("INPUT")
            .help("image file to search for license plates")
            .required(true)
            .index(1))
        .arg(Arg::with_name("tessdata")
            .long("tessdata")
            .takes_value(true)
            .default_value("./tessdata")
            .help("directory for tesseract language data, downloaded on first run"))
        .arg(Arg::with_name("lang")
            .long("lang")
            .takes_value(true)
            .default_value("eng")
            .help("tesseract language code"))
        .arg(Arg::with_name("output")
            .short("o")
            .long("output")
            .takes_value(true)
            .help("write the input image with detected regions outlined to this file"))
        .get_matches();

    let input = matches.value_of("INPUT").ok_or("image is required")?;
    let tessdata = matches.value_of("tessdata").unwrap();
    let lang = matches.value_of("lang").unwrap();

    let img = image::open(input)?;
    let engine = TesseractOcr::new(tessdata, lang)?;
    let mut detector = LicensePlateDetector::new(engine);
    let session = detector.detect(&img)?;

    if session.state() == SessionState::NoneFound {
        println!("no license plate recognized");
        return Ok(());
    }
    for (index, text) in session.texts().iter().enumerate() {
        println!("candidate {}: {}", index, text);
    }
    if let Some(best) = session.best() {
        println!("best: {}", best);
    }
    if let Some(path) = matches.value_of("output") {
        annotate(&img, &session).save(path)?;
    }

    Ok(())
}
