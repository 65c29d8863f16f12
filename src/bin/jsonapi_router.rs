fn main() -> anyhow::Result<()> {
    jsonapi_router::cli::run_cli()
}
