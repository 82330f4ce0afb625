//! Root crate facade for the rowpaint renderer and its desktop viewer.

pub use rowpaint_core::*;

#[cfg(feature = "gui")]
/// Desktop viewer (feature-gated).
pub mod gui {
    pub use rowpaint_gui::{
        document, exit_code, load_document, run, run_from_args, DemoArgs, DemoError,
        RowpaintApp,
    };
}
