//! Desktop viewer launched from the workspace root.

fn main() {
    let result = rowpaint::gui::run_from_args();
    if let Err(err) = &result {
        eprintln!("rowpaint error: {}", err);
    }
    let code = rowpaint::gui::exit_code(&result);
    if code != 0 {
        std::process::exit(code);
    }
}
