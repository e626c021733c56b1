fn main() -> anyhow::Result<()> {
    sigscan_lib::run()
}
