fn main() {
    stormcell_pipeline::cli::run();
}
