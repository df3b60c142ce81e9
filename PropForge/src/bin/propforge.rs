fn main() -> anyhow::Result<()> {
    propforge::cli::run_cli()
}
