//! The `check` command: compile a script and report its diagnostics.

use tale_diagnostic::Diagnostic;

use super::load_project;

/// One diagnostic as `uri:line:col: severity[code]: message`, 1-based.
fn render(uri: &str, diagnostic: &Diagnostic) -> String {
    format!(
        "{uri}:{}:{}: {}[{}]: {}",
        diagnostic.range.start.line + 1,
        diagnostic.range.start.character + 1,
        diagnostic.severity,
        diagnostic.code,
        diagnostic.message
    )
}

/// Print every diagnostic of the compile, exiting non-zero on errors.
pub fn check_file(path: &str, include_dirs: &[String]) {
    let (mut workspace, root) = load_project(path, include_dirs);
    let program = workspace.compile(&root);

    let mut errors = 0;
    let mut warnings = 0;
    for (uri, diagnostic) in program.all_diagnostics() {
        if diagnostic.is_error() {
            errors += 1;
        } else if diagnostic.is_warning() {
            warnings += 1;
        }
        eprintln!("{}", render(uri, diagnostic));
    }

    if errors > 0 {
        eprintln!("{errors} error(s), {warnings} warning(s)");
        std::process::exit(1);
    }
    println!(
        "OK: {path} ({} script(s), {warnings} warning(s))",
        program.scripts.len()
    );
}
