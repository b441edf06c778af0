fn main() -> anyhow::Result<()> {
    fdc3_smoke::run()
}
