//! The `compile` command: compile a script and print the program as JSON.

use super::load_project;

pub fn compile_file(path: &str, include_dirs: &[String]) {
    let (mut workspace, root) = load_project(path, include_dirs);
    let program = workspace.compile(&root);
    match serde_json::to_string_pretty(&*program) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: cannot serialize program for '{path}': {e}");
            std::process::exit(1);
        }
    }
}
