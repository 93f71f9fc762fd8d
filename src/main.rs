//! Arrocco UCI entry point.

fn main() {
    arrocco::init();
    arrocco::uci::run();
}
