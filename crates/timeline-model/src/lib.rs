//! Storyreel Timeline Model
//!
//! Defines the declarative contract consumed by the compiler:
//! - **Schema:** The raw JSON config (`video`, `timeline.images`)
//! - **Settings:** Output resolution and frame rate
//! - **Effects / Transitions:** Closed sum types for per-clip motion and joins
//! - **Timeline:** Ordered, validated clips ready for compilation
//! - **Assets:** Read-only resolution of clip sources inside an asset directory

pub mod assets;
pub mod effect;
pub mod schema;
pub mod settings;
pub mod timeline;
pub mod transition;

pub use assets::*;
pub use effect::*;
pub use schema::*;
pub use settings::*;
pub use timeline::*;
pub use transition::*;
