pub mod traits;
pub mod fetcher;

pub use fetcher::{FileSource, HttpSource};
pub use traits::Source;

/// Picks an HTTP or file source from the configured location.
pub fn source_for(location: &str) -> Box<dyn Source> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}
