fn main() {
    if let Err(err) = twist_cli::run() {
        twist_cli::ui::error(&err.to_string());
        std::process::exit(1);
    }
}
