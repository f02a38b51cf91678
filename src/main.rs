use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
    process::{Command, ExitCode},
    rc::Rc,
    time::Instant,
};

use clap::Parser;
use colored::Colorize;
use tracing::{debug, info, Level};

use foc::{
    compiler::compiler::generate, display_error, lexer::lexer::tokenize, parser::parser::parse,
    type_checker::type_checker::SemanticChecker,
};

/// Compiles a Foc source file to x86-64 NASM assembly.
#[derive(Parser, Debug)]
#[command(name = "foc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source file to compile
    #[arg(short, long)]
    input: PathBuf,

    /// Log every compilation step
    #[arg(short, long)]
    debug: bool,

    /// Stop checking after this many errors
    #[arg(short, long, default_value_t = 1)]
    error_limit: usize,

    /// Where to write the assembly
    #[arg(short, long, default_value = "out.asm")]
    output: PathBuf,

    /// Run nasm and ld on the output
    #[arg(long)]
    assemble: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    if compile(&cli) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn compile(cli: &Cli) -> bool {
    let start = Instant::now();

    let source = match read_to_string(&cli.input) {
        Ok(source) => source,
        Err(error) => {
            eprintln!(
                "{} cannot read {}: {}",
                "Error:".red().bold(),
                cli.input.display(),
                error
            );
            return false;
        }
    };
    let file_name = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.input.to_string_lossy().into_owned());

    let tokens = match tokenize(source.clone(), Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => {
            display_error(&error, &source);
            return false;
        }
    };
    info!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let mut program = match parse(tokens, Rc::new(file_name)) {
        Ok(program) => program,
        Err(error) => {
            display_error(&error, &source);
            return false;
        }
    };
    info!("Parsed in {:?}", parse_start.elapsed());
    debug!("{} functions", program.decls.len());

    let check_start = Instant::now();
    let mut checker = SemanticChecker::new(cli.error_limit);
    let error_count = match checker.check_program(&mut program) {
        Ok(count) => count,
        Err(error) => {
            eprintln!("{} {}", "Internal error:".red().bold(), error);
            return false;
        }
    };
    info!("Type checked in {:?}", check_start.elapsed());

    for warning in checker.warnings() {
        let position = warning.get_position();
        eprintln!(
            "{} {} ({}:{})",
            "Warning:".yellow().bold(),
            warning,
            position.1,
            position.0
        );
    }
    for error in checker.errors() {
        display_error(error, &source);
    }

    if error_count >= cli.error_limit.max(1) {
        println!("{}", "Too many errors, compilation stopped early".red());
        return false;
    }
    if error_count > 0 {
        println!(
            "{}",
            format!("Compilation failed: {} errors", error_count).red()
        );
        return false;
    }

    let codegen_start = Instant::now();
    let assembly = match generate(&program) {
        Ok(assembly) => assembly,
        Err(error) => {
            eprintln!("{} {}", "Error:".red().bold(), error);
            return false;
        }
    };
    info!("Generated assembly in {:?}", codegen_start.elapsed());

    if let Err(error) = write(&cli.output, assembly) {
        eprintln!(
            "{} cannot write {}: {}",
            "Error:".red().bold(),
            cli.output.display(),
            error
        );
        return false;
    }

    if cli.assemble && !assemble(&cli.output) {
        return false;
    }

    info!("Total time: {:?}", start.elapsed());
    println!("{}", "Compilation was successful.".green());
    true
}

/// `nasm -f elf64` followed by `ld`, next to the assembly file.
fn assemble(asm: &Path) -> bool {
    let object = asm.with_extension("o");
    let binary = asm.with_extension("");

    let steps = [
        (
            "nasm",
            vec![
                String::from("-f"),
                String::from("elf64"),
                asm.to_string_lossy().into_owned(),
                String::from("-o"),
                object.to_string_lossy().into_owned(),
            ],
        ),
        (
            "ld",
            vec![
                object.to_string_lossy().into_owned(),
                String::from("-o"),
                binary.to_string_lossy().into_owned(),
            ],
        ),
    ];

    for (program, args) in steps {
        let step_start = Instant::now();
        match Command::new(program).args(&args).output() {
            Ok(output) if output.status.success() => {
                info!("{} finished in {:?}", program, step_start.elapsed());
            }
            Ok(output) => {
                eprintln!(
                    "{} {} failed:\n{}",
                    "Error:".red().bold(),
                    program,
                    String::from_utf8_lossy(&output.stderr)
                );
                return false;
            }
            Err(error) => {
                eprintln!("{} cannot run {}: {}", "Error:".red().bold(), program, error);
                return false;
            }
        }
    }

    true
}
