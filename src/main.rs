fn main() {
    if let Err(e) = kwtools::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
