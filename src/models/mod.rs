pub mod loaders;
pub mod reference;
pub mod student;
pub mod submission;
pub mod view_state;

pub use loaders::load_reference_folder;
pub use reference::ReferenceFileSet;
pub use student::StudentIdentity;
pub use submission::{Catalog, SubmissionRecord};
pub use view_state::ViewState;
