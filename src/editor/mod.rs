pub mod area;
pub mod session;

pub use area::{AreaKind, HostRequest, InteractionArea, Mark, Phase, anchor_position};
pub use session::{EditorOutcome, EditorSession};
