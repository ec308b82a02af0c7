fn main() {
    use netscaler_graph::cli::parse;
    let cli = parse();
    let code = netscaler_graph::app::run_cli(cli);
    if code != 0 {
        std::process::exit(code);
    }
}
