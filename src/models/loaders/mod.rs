pub mod reference_loader;

pub use reference_loader::load_reference_folder;
