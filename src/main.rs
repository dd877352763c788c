fn main() {
    if let Err(err) = csv_live::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
