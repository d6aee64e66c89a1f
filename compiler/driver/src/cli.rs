use clap::{
    builder::{PossibleValue, TypedValueParser, ValueParser},
    value_parser, Arg, ArgAction, ArgMatches,
};
use diagnostics::error::Result;
use std::{ffi::OsStr, path::PathBuf};
use utility::paint::ColorChoice;

pub(crate) fn arguments() -> Result<(Command, GlobalOptions)> {
    let paths_arg = Arg::new(argument::PATH)
        .required(true)
        .action(ArgAction::Append)
        .value_parser(ValueParser::path_buf())
        .help(
            "The paths to the source files, each of them a submission continuing the previous one. \
             A path of ‘-’ denotes the standard input",
        );

    let unstable_opts = Arg::new(option::UNSTABLE_OPTION)
        .short('Z')
        .value_name("OPTION")
        .action(ArgAction::Append)
        .help("Set an unstable option. See ‘-Z help’ for details");

    // @Task use `try_get_matches` to exit with code 2 instead of 1 on error
    let matches = clap::Command::new("cinder")
        .bin_name("cinder")
        .version(env!("CARGO_PKG_VERSION"))
        .about("The compiler and interpreter of the Cinder programming language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args([
            Arg::new(option::QUIET)
                .long("quiet")
                .short('q')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Suppress the values of submissions from being printed to stdout"),
            Arg::new(option::COLOR)
                .long("color")
                .global(true)
                .value_name("WHEN")
                .value_parser(ColorChoiceParser)
                .help("Control when to use color"),
        ])
        .subcommands([
            clap::Command::new(subcommand::CHECK)
                .visible_alias("c")
                .about("Check the given source files for errors")
                .args([&paths_arg, &unstable_opts]),
            clap::Command::new(subcommand::RUN)
                .visible_alias("r")
                .about("Compile and evaluate the given source files")
                .args([paths_arg, unstable_opts])
                .arg(
                    Arg::new(option::SEED)
                        .long("seed")
                        .value_name("N")
                        .value_parser(value_parser!(u64))
                        .help("Seed the random number generator behind the builtin ‘rand’"),
                ),
        ])
        .get_matches();

    let command = match matches.subcommand() {
        Some((subcommand::CHECK, matches)) => Command::Check {
            opts: BuildOptions::deserialize(matches, unstable::deserialize(matches)?),
        },
        Some((subcommand::RUN, matches)) => Command::Run {
            opts: BuildOptions::deserialize(matches, unstable::deserialize(matches)?),
            seed: matches.get_one(option::SEED).copied(),
        },
        _ => unreachable!(),
    };

    Ok((command, GlobalOptions::deserialize(&matches)))
}

mod subcommand {
    pub(super) const CHECK: &str = "check";
    pub(super) const RUN: &str = "run";
}

mod argument {
    pub(super) const PATH: &str = "PATH";
}

mod option {
    pub(super) const COLOR: &str = "color";
    pub(super) const QUIET: &str = "quiet";
    pub(super) const SEED: &str = "seed";
    pub(super) const UNSTABLE_OPTION: &str = "unstable_option";
}

pub(crate) enum Command {
    Check { opts: BuildOptions },
    Run { opts: BuildOptions, seed: Option<u64> },
}

impl Command {
    pub(crate) fn options(&self) -> &BuildOptions {
        match self {
            Self::Check { opts } | Self::Run { opts, .. } => opts,
        }
    }
}

pub(crate) struct GlobalOptions {
    pub(crate) quiet: bool,
    pub(crate) color: ColorChoice,
}

impl GlobalOptions {
    fn deserialize(matches: &ArgMatches) -> GlobalOptions {
        Self {
            quiet: matches.get_flag(option::QUIET),
            color: matches.get_one(option::COLOR).copied().unwrap_or_default(),
        }
    }
}

#[derive(Default)]
pub(crate) struct BuildOptions {
    pub(crate) paths: Vec<PathBuf>,
    pub(crate) emit_tokens: bool,
    pub(crate) emit_ast: bool,
    pub(crate) emit_bound: bool,
    pub(crate) emit_lowered: bool,
    pub(crate) emit_cfg: bool,
    pub(crate) timing: bool,
}

impl BuildOptions {
    fn deserialize(matches: &ArgMatches, unstable_opts: Vec<unstable::BuildOption>) -> Self {
        let mut options = Self {
            paths: matches
                .get_many::<PathBuf>(argument::PATH)
                .into_iter()
                .flatten()
                .cloned()
                .collect(),
            ..Self::default()
        };

        for unstable_option in unstable_opts {
            use unstable::BuildOption::*;

            match unstable_option {
                EmitTokens => options.emit_tokens = true,
                EmitAst => options.emit_ast = true,
                EmitBound => options.emit_bound = true,
                EmitLowered => options.emit_lowered = true,
                EmitCfg => options.emit_cfg = true,
                Timing => options.timing = true,
            }
        }

        options
    }
}

#[derive(Clone)]
struct ColorChoiceParser;

impl TypedValueParser for ColorChoiceParser {
    type Value = ColorChoice;

    fn parse_ref(
        &self,
        _: &clap::Command,
        _: Option<&Arg>,
        source: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let source = parse_utf8(source)?;

        source.parse().map_err(|()| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("‘{source}’ is not a valid color choice\n"),
            )
        })
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue>>> {
        Some(Box::new(
            ColorChoice::elements().map(|mode| PossibleValue::new(mode.name())),
        ))
    }
}

fn parse_utf8(source: &OsStr) -> Result<&str, clap::Error> {
    source
        .to_str()
        .ok_or_else(|| clap::Error::raw(clap::error::ErrorKind::InvalidUtf8, "invalid UTF-8\n"))
}

mod unstable {
    use clap::ArgMatches;
    use diagnostics::{error::Result, Diagnostic, Reporter};
    use std::{
        io::{self, Write},
        iter::once,
    };
    use utility::{
        paint::{AnsiColor, ColorChoice, Effects, Painter},
        pluralize, Conjunction, ListingExt, QuoteExt,
    };

    const HELP_OPTION: &str = "help";

    pub(super) fn deserialize(matches: &ArgMatches) -> Result<Vec<BuildOption>> {
        let mut options = Vec::new();
        let mut invalid_options = Vec::new();

        if let Some(unparsed_options) = matches.get_many::<String>(super::option::UNSTABLE_OPTION) {
            for option in unparsed_options {
                if option == HELP_OPTION {
                    // Failing to print the help is not worth reporting.
                    let _ = help();
                    std::process::exit(0);
                }

                match BuildOption::parse(option) {
                    Some(option) => options.push(option),
                    None => invalid_options.push(option.as_str()),
                }
            }
        }

        if !invalid_options.is_empty() {
            Err(Diagnostic::error()
                .message(format!(
                    "invalid unstable {} {}",
                    pluralize!(invalid_options.len(), "option"),
                    invalid_options
                        .into_iter()
                        .map(QuoteExt::quote)
                        .list(Conjunction::And)
                ))
                .report(&Reporter::stderr(ColorChoice::Auto)))
        } else {
            Ok(options)
        }
    }

    fn help() -> io::Result<()> {
        let mut stdout = Painter::stdout(ColorChoice::Auto);

        stdout.set(Effects::BOLD | Effects::UNDERLINE)?;
        writeln!(stdout, "Unstable Options:")?;
        stdout.unset()?;

        let mut elements: Vec<_> = BuildOption::ELEMENTS
            .iter()
            .map(|element| (element.syntax(), element.help()))
            .chain(once((HELP_OPTION, "Print help information and halt")))
            .collect();

        let padding = elements
            .iter()
            .map(|(syntax, _)| syntax.len())
            .max()
            .unwrap_or_default();

        elements.sort_by_key(|&(syntax, _)| syntax);

        for (syntax, help) in elements {
            stdout.set(Effects::BOLD)?;
            write!(stdout, "    -Z {syntax:<padding$}     ")?;
            stdout.unset()?;
            writeln!(stdout, "{help}")?;
        }

        writeln!(stdout)?;

        stdout.set(AnsiColor::Red)?;
        writeln!(stdout, "\
            These options are not subject to any stability guarantees.\n\
            They may be CHANGED in their behavior or REMOVED ENTIRELY at any time and without further notice.\n\
            If this program is executed with any of these options specified,\n\
            its behavior and especially the form of its output MUST NOT BE RELIED UPON.\
        ")?;
        stdout.unset()?;

        stdout.flush()
    }

    macro_rules! options {
        ($( $option:ident => $syntax:literal: $help:literal, )+) => {
            #[derive(Clone, Copy)]
            pub(super) enum BuildOption {
                $( $option, )+
            }

            impl BuildOption {
                const ELEMENTS: &'static [Self] = &[$( Self::$option ),+];

                fn parse(source: &str) -> Option<Self> {
                    match source {
                        $( $syntax => Some(Self::$option), )+
                        _ => None,
                    }
                }

                fn syntax(self) -> &'static str {
                    match self {
                        $( Self::$option => $syntax, )+
                    }
                }

                fn help(self) -> &'static str {
                    match self {
                        $( Self::$option => $help, )+
                    }
                }
            }
        };
    }

    options! {
        EmitAst => "emit-ast": "Emit the abstract syntax tree (AST) of each submission output by the parser",
        EmitBound => "emit-bound": "Emit the bound global statements of each submission output by the binder",
        EmitCfg => "emit-cfg": "Emit the control flow graph of each function body in the Graphviz format",
        EmitLowered => "emit-lowered": "Emit the lowered function bodies and global statements of each submission",
        EmitTokens => "emit-tokens": "Emit the tokens of each source file output by the lexer",
        Timing => "timing": "Print the time of each pass through each submission",
    }
}
