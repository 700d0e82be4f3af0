pub mod cache;
pub mod hit;
pub mod preview;
pub mod session;

pub use cache::{CachedMaterial, CachedSnapshot, ObjectContext, PickLineAnchor, SnapshotKind};
pub use hit::{Layout, hit_test_item, hit_test_sub_item};
pub use preview::{NoPreviews, PreviewImage, PreviewProvider, PreviewSource};
pub use session::{CursorAction, Pick, PickerOutcome, PickerSession};
