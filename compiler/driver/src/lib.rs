use cli::{BuildOptions, Command, GlobalOptions};
use compilation::Compilation;
use control_flow::ControlFlowGraph;
use diagnostics::{
    error::{Health, Outcome, Result, Stain},
    reporter::ErasedReportedError,
    Diagnostic, Reporter,
};
use evaluator::{Console, Context};
use hir::display_statements;
use span::{FileName, SourceFileIndex, SourceMap};
use std::{
    borrow::Cow,
    io::{self, Read},
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, PoisonError, RwLock,
    },
};
use utility::{
    default,
    paint::{epaint, ColorChoice},
    FormatError, QuoteExt,
};

mod cli;

/// Measure the execution time of the given statements and print it if requested.
///
/// Bindings introduced by the statements remain in scope afterwards.
macro_rules! time {
    ($timing:expr, $name:literal; $( $block:tt )+) => {
        let time = std::time::Instant::now();
        $( $block )+
        let duration = time.elapsed();

        if $timing {
            eprintln!("  {:<30}{duration:?}", $name);
        }
    };
}

pub fn main() -> Result {
    set_panic_hook();

    let (command, opts) = cli::arguments()?;

    let map: Arc<RwLock<SourceMap>> = default();
    let reported_any_errors: Arc<AtomicBool> = default();
    let reporter =
        Reporter::buffered_stderr(opts.color, reported_any_errors.clone()).with_map(map.clone());

    let result = execute_command(command, &opts, &map, reporter);

    let reported_any_errors = reported_any_errors.load(Ordering::SeqCst);

    if let Err(error) = result {
        assert!(
            reported_any_errors,
            "an error occurred but nothing was reported"
        );
        return Err(error);
    }

    // Checking continues past erroneous submissions without failing as a whole.
    if reported_any_errors {
        return Err(ErasedReportedError::new_unchecked());
    }

    Ok(())
}

fn execute_command(
    command: Command,
    global_opts: &GlobalOptions,
    map: &Arc<RwLock<SourceMap>>,
    reporter: Reporter,
) -> Result {
    let opts = command.options();

    let mut context = match &command {
        &Command::Run { seed, .. } => Some(Context::new(Console, seed)),
        Command::Check { .. } => None,
    };

    if opts.timing {
        eprintln!("Execution times by pass:");
    }

    let mut previous: Option<Arc<Compilation>> = None;

    for path in &opts.paths {
        let file = load_file(path, map, &reporter)?;
        let compilation = Arc::new(compile(
            file,
            previous.as_ref(),
            opts,
            global_opts,
            map,
            &reporter,
        ));

        if let Some(context) = &mut context {
            time! { opts.timing, "Evaluation";
                let value = compilation.evaluate(context, &reporter)?;
            }

            if let Some(value) = value {
                if !global_opts.quiet {
                    println!("{value}");
                }
            }
        }

        previous = Some(compilation);
    }

    Ok(())
}

fn load_file(
    path: &Path,
    map: &Arc<RwLock<SourceMap>>,
    reporter: &Reporter,
) -> Result<SourceFileIndex> {
    let file = {
        let mut map = map.write().unwrap_or_else(PoisonError::into_inner);

        if path == Path::new("-") {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map(|_| map.add(FileName::Stdin, Arc::new(source)))
        } else {
            map.load(path.to_owned())
        }
    };

    file.map_err(|error| {
        Diagnostic::error()
            .message(format!("could not load the file {}", path.display().quote()))
            .note(error.format())
            .report(reporter)
    })
}

/// Lex, parse, bind and lower a single submission.
///
/// The stages are computed eagerly to print intermediate artifacts and to time them.
fn compile(
    file: SourceFileIndex,
    previous: Option<&Arc<Compilation>>,
    opts: &BuildOptions,
    global_opts: &GlobalOptions,
    map: &Arc<RwLock<SourceMap>>,
    reporter: &Reporter,
) -> Compilation {
    let mut health = Health::Untainted;

    let unit = {
        let map = map.read().unwrap_or_else(PoisonError::into_inner);

        time! { opts.timing, "Lexing";
            let tokens = lexer::lex(&map[file], reporter).stain(&mut health);
        }

        if opts.emit_tokens {
            for token in &tokens {
                eprintln!("{token:?}");
            }
        }

        time! { opts.timing, "Parsing";
            let unit = parser::parse(tokens, reporter).stain(&mut health);
        }

        unit
    };

    if opts.emit_ast {
        // Nothing sensible can be done if writing to stderr fails.
        let _ = epaint(
            |painter| ast::Node::CompilationUnit(&unit).render(painter),
            global_opts.color,
        );
        eprintln!();
    }

    let units = vec![Outcome::new(unit, health)];
    let compilation = match previous {
        Some(previous) => previous.continue_with(units),
        None => Compilation::new(units),
    };

    time! { opts.timing, "Binding and Lowering";
        let global_scope = compilation.global_scope(reporter).bare;
        let program = compilation.program(reporter).bare;
    }

    if opts.emit_bound {
        eprintln!("{}", display_statements(&global_scope.statements));
    }

    if opts.emit_lowered {
        for (function, body) in program.function_bodies() {
            eprintln!("function {function}:\n{}", display_statements(body));
        }
        eprintln!("<global>:\n{}", display_statements(&program.statements));
    }

    if opts.emit_cfg {
        for (_, body) in program.function_bodies() {
            eprintln!("{}", ControlFlowGraph::build(body).graphviz());
        }
    }

    compilation
}

fn set_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let payload = info.payload();

        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown cause")
            .to_owned();

        let backtrace = std::env::var("CINDER_BACKTRACE")
            .is_ok_and(|variable| variable != "0")
            .then(std::backtrace::Backtrace::force_capture);

        Diagnostic::bug()
            .message(message)
            .with(|it| match info.location() {
                Some(location) => it.note(format!("at ‘{location}’")),
                None => it,
            })
            .note(std::thread::current().name().map_or_else(
                || Cow::from("in an unnamed thread"),
                |name| format!("in thread ‘{name}’").into(),
            ))
            .note("the compiler unexpectedly panicked. this is a bug. we would appreciate a bug report")
            .note(format!("cinder {}", env!("CARGO_PKG_VERSION")))
            .with(|it| match backtrace {
                Some(backtrace) => it.note(format!("with the following backtrace:\n{backtrace}")),
                None => it.help(
                    "rerun with the environment variable ‘CINDER_BACKTRACE=1’ to display a backtrace",
                ),
            })
            // FIXME: respect `--color`
            .report(&Reporter::stderr(ColorChoice::Auto));
    }));
}
