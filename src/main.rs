use std::process;

fn main() {
    if let Err(e) = mapf_replay::cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
