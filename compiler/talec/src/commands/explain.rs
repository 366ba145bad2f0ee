//! The `explain` command: describe a diagnostic code.

use tale_diagnostic::ErrorCode;

pub fn explain_error(code_str: &str) {
    let Some(code) = code_str.parse::<ErrorCode>().ok() else {
        eprintln!("Unknown error code: {code_str}");
        eprintln!();
        eprintln!("Codes have the format EXXXX where X is a digit.");
        eprintln!("Examples: E1001, E2001, E9001");
        std::process::exit(1);
    };
    println!("{code}: {}", code.description());
}
