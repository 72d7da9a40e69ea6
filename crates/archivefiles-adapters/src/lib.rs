//! Archiver backends for ArchiveFiles

mod sevenzip;
mod tar;
mod zip;

pub use sevenzip::SevenZipArchiver;
pub use tar::TarArchiver;
pub use zip::ZipArchiver;

use archivefiles_core::ArchiverFactory;

/// Create an archiver factory with all backends registered
pub fn create_archiver_factory() -> ArchiverFactory {
    let mut factory = ArchiverFactory::new();
    factory.register(Box::new(SevenZipArchiver::new()));
    factory.register(Box::new(TarArchiver::new()));
    factory.register(Box::new(ZipArchiver::new()));
    factory
}
