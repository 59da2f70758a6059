fn main() {
    if let Err(err) = sql_managed::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
