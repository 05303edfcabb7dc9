// Loader configuration
pub mod settings;

pub use settings::LoaderSettings;
