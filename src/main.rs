use clap::{Parser as ClapParser, Subcommand};
use expressive::cli::{self, CliError, EvalOptions, EvalResult};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "expressive")]
#[command(about = "Expressive - evaluate formulas against named variables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and evaluate an expression
    Eval {
        /// The expression to evaluate
        expression: String,

        /// Bind a variable (NAME=VALUE, or NAME==EXPRESSION for a nested expression)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        /// Variables as a JSON object (reads from stdin if not provided)
        #[arg(long = "vars", value_name = "JSON")]
        vars_json: Option<String>,

        /// Print the result as JSON
        #[arg(short, long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'expressive docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            expression,
            vars,
            vars_json,
            json,
            pretty,
            syntax_only,
        } => run_eval(expression, vars, vars_json, json, pretty, syntax_only),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_eval(
    expression: String,
    vars: Vec<String>,
    vars_json: Option<String>,
    json: bool,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let vars_json = match vars_json {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = EvalOptions {
        expression,
        vars,
        vars_json,
        syntax_only,
    };

    match cli::execute_eval(&options)? {
        EvalResult::SyntaxValid => println!("Syntax is valid"),
        EvalResult::Success(value) if json || pretty => {
            let output = cli::value_to_json(value);
            let text = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{}", text);
        }
        EvalResult::Success(value) => println!("{}", value),
    }
    Ok(())
}
