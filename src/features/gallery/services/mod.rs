mod gallery_service;

pub use gallery_service::GalleryService;

#[cfg(test)]
pub(crate) use gallery_service::stub;
