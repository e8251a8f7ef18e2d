use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "spex", arg_required_else_help = true)]
/// SPARQL example catalog and notes toolkit
pub struct Args {
    /// Print debug logs
    ///
    /// The RUST_LOG environment variable takes precedence.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert the SPARQL example Turtle files of a directory into the example catalog CSV
    ToCsv {
        /// Directory containing the Turtle files of one example collection
        #[arg(value_hint = ValueHint::DirPath)]
        examples_dir: PathBuf,
        /// Destination CSV file
        ///
        /// If no file is given, stdout is written.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Numeric backend identifier written to every row
        #[arg(long, default_value_t = spex_catalog::DEFAULT_BACKEND_ID, allow_negative_numbers = true)]
        backend_id: i64,
        /// Prefix each title with its identifier (e.g. 'ex:1 Title')
        ///
        /// The id column is left empty in that case.
        #[arg(long)]
        prefix_id_in_title: bool,
    },
    /// Generate the index page listing the example directories of a published site
    Index {
        /// Root directory of the published site
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        site: PathBuf,
        /// Directory of the example pages, relative to the site root
        #[arg(long, default_value = "examples")]
        examples_dir: String,
        /// Heading of the page
        #[arg(long, default_value = "SPARQL examples")]
        title: String,
        /// File to write the page to
        ///
        /// If no file is given, stdout is written.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Check that every link of a markdown page resolves inside the published site
    CheckLinks {
        /// The markdown page to check
        #[arg(value_hint = ValueHint::FilePath)]
        page: PathBuf,
        /// Root directory of the published site
        ///
        /// By default the directory of the page is used.
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        site: Option<PathBuf>,
    },
    /// Check markdown pages and their shell snippets for malformed syntax
    Lint {
        /// The markdown pages to check
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },
    /// List the shell recipes of a notes page with their placeholders
    Recipes {
        /// The markdown notes page
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Value of a placeholder, as NAME=VALUE
        ///
        /// Can be repeated. Recipes are printed with the given values substituted.
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    let (name, value) = value
        .split_once('=')
        .ok_or_else(|| format!("'{value}' is not of the form NAME=VALUE"))?;
    if name.is_empty() {
        return Err(format!("'{name}={value}' has an empty name"));
    }
    Ok((name.to_owned(), value.to_owned()))
}
