use clap::Parser;
use serde_json::Value;
use string_replacer::expression::Template;
use string_replacer::Replacer;
use tracing::Level;

/// Render a `${...}` template against a JSON parameter object.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Template string, e.g. 'hello ${user.name | upper}'
    template: String,
    /// Parameter object as a JSON string
    #[arg(long, conflicts_with = "params_file")]
    params: Option<String>,
    /// Read the parameter object from a JSON file
    #[arg(long)]
    params_file: Option<std::path::PathBuf>,
    /// Print the parsed template instead of rendering it
    #[arg(long)]
    ast: bool,
    /// Log pipe application to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    if args.ast {
        let ast = Template::parse(&args.template);
        match serde_json::to_string_pretty(&ast) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Cannot serialize template: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    // Load the parameter object.
    let raw = match (&args.params, &args.params_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Cannot read {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        (None, None) => "{}".to_string(),
    };
    let params: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid JSON: {e}");
            std::process::exit(1);
        }
    };

    let replacer = Replacer::with_builtins();
    println!("{}", replacer.replace(&args.template, &params));
}
