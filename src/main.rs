fn main() {
    if let Err(err) = variant_view::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
