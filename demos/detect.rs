use std::env::args;
use std::error::Error;
use std::process;

use plate_detect::ocr::TesseractOcr;
use plate_detect::LicensePlateDetector;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = args();
    args.next();
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("didn't get an image from args");
            process::exit(1);
        }
    };

    let img = image::open(path)?;
    let engine = TesseractOcr::new("./tessdata", "eng")?;
    let mut detector = LicensePlateDetector::new(engine);
    let session = detector.detect(&img)?;

    for text in session.texts() {
        println!("candidate: {}", text);
    }
    match session.best() {
        Some(text) => println!("plate: {}", text),
        None => println!("no license plate recognized"),
    }

    Ok(())
}
