//! Tale compiler CLI.

use talec::commands::{check_file, compile_file, eval_expression, explain_error, parse_include_dirs};

fn main() {
    talec::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "compile" => {
            let (positional, include_dirs) = parse_include_dirs(&args[2..]);
            let Some(path) = positional.first() else {
                eprintln!("Usage: tale compile <file.tale> [--include-dir <dir>]...");
                std::process::exit(1);
            };
            compile_file(path, &include_dirs);
        }
        "check" => {
            let (positional, include_dirs) = parse_include_dirs(&args[2..]);
            let Some(path) = positional.first() else {
                eprintln!("Usage: tale check <file.tale> [--include-dir <dir>]...");
                std::process::exit(1);
            };
            check_file(path, &include_dirs);
        }
        "eval" => {
            if args.len() < 3 {
                eprintln!("Usage: tale eval <expression> [name=value]...");
                std::process::exit(1);
            }
            eval_expression(&args[2], &args[3..]);
        }
        "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: tale explain <error-code>");
                eprintln!("Example: tale explain E2001");
                std::process::exit(1);
            }
            explain_error(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("tale {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Tale Compiler");
    println!();
    println!("Usage: tale <command> [options]");
    println!();
    println!("Commands:");
    println!("  compile <file>     Compile a script and print the program as JSON");
    println!("  check <file>       Report diagnostics for a script and its includes");
    println!("  eval <expr>        Evaluate an expression, with name=value bindings");
    println!("  explain <code>     Describe a diagnostic code");
    println!("  help               Show this message");
    println!("  version            Show version information");
    println!();
    println!("Options for compile and check:");
    println!("  --include-dir <dir>  Also load scripts and assets from <dir>");
    println!();
    println!("Logging: set TALE_LOG (or RUST_LOG) to a filter such as 'talec=debug'.");
    println!("Set TALE_LOG_TREE=1 for indented span output.");
}
