//! Desktop front end for the rowpaint renderer.
//!
//! Exposes a `run` helper so the workspace root can launch the viewer
//! without duplicating initialization logic.

mod app;
/// Rope-backed demo document and cursor model.
pub mod document;
mod input;
/// egui shaping backend.
pub mod shaper;
/// egui paint surface.
pub mod surface;

pub use app::{load_document, DemoError, RowpaintApp};

use clap::Parser;
use eframe::egui;
use rowpaint_core::ViewConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type AppCreation = Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_LOG_FILTER: &str = "rowpaint_core=warn,rowpaint_gui=info";

/// Command-line options of the viewer.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "rowpaint-demo", about = "Incremental text view demo", version)]
pub struct DemoArgs {
    /// File to display (a built-in sample when omitted)
    pub file: Option<PathBuf>,

    /// Soft-wrap lines at this many characters
    #[arg(short, long)]
    pub wrap: Option<usize>,

    /// Highlight every occurrence of this text
    #[arg(short, long)]
    pub find: Option<String>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Load the document, then start the viewer with tracing enabled.
///
/// The file is read before any window opens, so a bad path fails fast.
///
/// # Errors
/// Returns [`DemoError::Read`] for an unreadable file, [`DemoError::Theme`]
/// when the theme fails to build, and [`DemoError::Viewer`] for any
/// `eframe` initialization or runtime error.
pub fn run(args: DemoArgs) -> Result<(), DemoError> {
    let document = load_document(&args)?;
    init_tracing();
    #[cfg(feature = "profile")]
    puffin::set_scopes_on(true);

    let config = ViewConfig::from_env();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(app::DEFAULT_WINDOW_SIZE)
            .with_min_inner_size(app::MIN_WINDOW_SIZE)
            .with_title("rowpaint"),
        ..Default::default()
    };

    eframe::run_native(
        "rowpaint",
        options,
        Box::new(move |cc: &eframe::CreationContext<'_>| -> AppCreation {
            let app = RowpaintApp::new(cc.egui_ctx.clone(), document, config)
                .map_err(|err| err.to_string())?;
            Ok(Box::new(app))
        }),
    )?;
    Ok(())
}

/// Parse the process arguments and run the viewer.
///
/// # Errors
/// See [`run`].
pub fn run_from_args() -> Result<(), DemoError> {
    run(DemoArgs::parse())
}

/// Process exit code for the outcome of [`run`].
pub fn exit_code(result: &Result<(), DemoError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(DemoError::Read { .. }) => 2,
        Err(DemoError::Theme(_) | DemoError::Viewer(_)) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_file_wrap_and_find() {
        let args = DemoArgs::parse_from(["rowpaint-demo", "notes.txt", "--wrap", "72", "-f", "todo"]);
        assert_eq!(args.file, Some(PathBuf::from("notes.txt")));
        assert_eq!(args.wrap, Some(72));
        assert_eq!(args.find.as_deref(), Some("todo"));

        let args = DemoArgs::parse_from(["rowpaint-demo"]);
        assert!(args.file.is_none() && args.wrap.is_none());
    }

    #[test]
    fn unreadable_file_fails_before_the_window_opens() {
        let args = DemoArgs::parse_from(["rowpaint-demo", "/definitely/not/here.txt"]);
        let result = run(args);
        assert!(matches!(result, Err(DemoError::Read { .. })));
        assert_eq!(exit_code(&result), 2);
        assert_eq!(exit_code(&Ok(())), 0);
    }

    #[test]
    fn rejects_non_numeric_wrap() {
        assert!(DemoArgs::try_parse_from(["rowpaint-demo", "--wrap", "wide"]).is_err());
    }
}
