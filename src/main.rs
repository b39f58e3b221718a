fn main() -> anyhow::Result<()> {
    mentionfeed::cli::run()
}
