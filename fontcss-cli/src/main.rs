//! Binary entrypoint for fontcss (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = fontcss_cli::run() {
        eprintln!("{}: {err:#}", fontcss_cli::PROG_NAME);
        std::process::exit(1);
    }
}
