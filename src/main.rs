mod logger;

use clap::{ArgAction, Args, Parser, Subcommand};
use pyexpr::{
    config::{self, ConfigError},
    filter::SubjectFilter,
    runtime::{Class, Error, Evaluator},
};
use std::{path::PathBuf, process};

#[derive(Parser, Debug)]
#[command(name = "pyexpr", version, about)]
struct Cli {
    /// Print more log messages. Repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all log messages.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an expression and print the result.
    Eval(EvalArgs),

    /// Check that an expression is well-formed without evaluating it.
    Check {
        expression: String,
    },

    /// Print the syntax tree of an expression.
    Parse {
        expression: String,

        /// Print the full tree instead of the parenthesized form.
        #[arg(long)]
        tree: bool,
    },

    /// Decide whether a SAML subject passes a filtration expression.
    Filter {
        expression: String,

        /// TOML file describing the subject.
        #[arg(long)]
        subject: PathBuf,
    },
}

#[derive(Args, Debug)]
struct EvalArgs {
    expression: String,

    /// TOML file whose top-level keys are visible to the expression.
    #[arg(long)]
    context: Option<PathBuf>,

    /// Bind a name, as NAME=VALUE. Overrides names from the context file.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    assignments: Vec<String>,

    /// Permit calling methods of a class.
    #[arg(long = "safe", value_name = "CLASS")]
    safe_classes: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    logger::init();
    log_panics::init();

    if cli.quiet {
        logger::quiet();
    } else {
        logger::verbose(cli.verbose);
    }

    process::exit(match cli.cmd {
        Command::Eval(args) => eval(args),
        Command::Check { expression } => check(&expression),
        Command::Parse { expression, tree } => parse(&expression, tree),
        Command::Filter { expression, subject } => filter(&expression, subject),
    });
}

fn eval(args: EvalArgs) -> exitcode::ExitCode {
    let mut context = match args.context.as_ref().map(config::load_context).transpose() {
        Ok(context) => context.unwrap_or_default(),
        Err(e) => return config_error(e),
    };

    for assignment in &args.assignments {
        match config::parse_assignment(assignment) {
            Ok((name, value)) => context = context.with(name, value),
            Err(e) => return config_error(e),
        }
    }

    let safe_classes = args.safe_classes.into_iter().map(Class::named).collect::<Vec<_>>();

    match Evaluator::new().evaluate(&args.expression, &context, &safe_classes) {
        Ok(value) => {
            println!("{:?}", value);
            exitcode::OK
        },
        Err(e) => expression_error(&e),
    }
}

fn check(expression: &str) -> exitcode::ExitCode {
    match Evaluator::new().validate(expression) {
        Ok(()) => {
            log::info!("expression is well-formed");
            exitcode::OK
        },
        Err(e) => expression_error(&e.into()),
    }
}

fn parse(expression: &str, tree: bool) -> exitcode::ExitCode {
    match Evaluator::new().parse(expression) {
        Ok(expr) if tree => {
            println!("{:#?}", expr);
            exitcode::OK
        },
        Ok(expr) => {
            println!("{}", expr);
            exitcode::OK
        },
        Err(e) => expression_error(&e.into()),
    }
}

fn filter(expression: &str, subject: PathBuf) -> exitcode::ExitCode {
    let subject = match config::load_subject(&subject) {
        Ok(subject) => subject,
        Err(e) => return config_error(e),
    };

    match SubjectFilter::default().execute(expression, &subject) {
        Ok(admitted) => {
            println!("{}", admitted);
            exitcode::OK
        },
        Err(e) => {
            log::error!("{}", e);
            exitcode::DATAERR
        },
    }
}

fn expression_error(error: &Error) -> exitcode::ExitCode {
    match error {
        Error::Parse(e) => log::error!("{:?}", e),
        Error::Evaluation(e) => log::error!("{}", e),
    }

    exitcode::DATAERR
}

fn config_error(error: ConfigError) -> exitcode::ExitCode {
    log::error!("{}", error);

    if error.is_io() {
        exitcode::NOINPUT
    } else {
        exitcode::CONFIG
    }
}
