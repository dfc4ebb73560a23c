//! Scene layout files

mod scene;

pub use scene::{EarLayout, SceneError, SceneLayout, SourceLayout};
