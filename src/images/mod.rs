pub mod services;

pub use services::{HttpImageFetcher, ImageFetcher};
