// cuterm - Serial line terminal
use cuterm::cli::args::Args;
use cuterm::cli::commands::execute_command;
use cuterm::cli::output::{ConsoleWriter, OutputWriter};

#[tokio::main]
async fn main() {
    let args = Args::parse_normalized();
    let writer = ConsoleWriter::new(args.output);

    // Exit from inside the runtime: the blocking stdin reader cannot be
    // joined on shutdown.
    match execute_command(args).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            if writer.write_error(&e.to_string()).is_err() {
                eprintln!("cuterm: {}", e);
            }
            std::process::exit(1);
        }
    }
}
