fn main() {
    if let Err(e) = cloudscope_cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
