mod cli;
mod content;
mod embed_cmd;
mod encode_cmd;
mod inspect_cmd;
mod shared;

use clap::Parser;
use cli::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Encode {
            ref font,
            index,
            ref cmap,
            ref text,
        } => encode_cmd::run(font, index, cmap, text),
        cli::Commands::Embed {
            ref font,
            index,
            no_subset,
            ref ranges,
            ref pdf_version,
            size,
            ref output,
            ref text,
        } => embed_cmd::run(&embed_cmd::EmbedArgs {
            font,
            index,
            subset: !no_subset,
            ranges,
            pdf_version,
            size,
            output,
            text,
        }),
        cli::Commands::Inspect { ref file, format } => inspect_cmd::run(file, format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
