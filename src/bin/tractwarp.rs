//! Command line runner for the `tractwarp` library.

#[cfg(not(feature = "for-testing"))]
#[quit::main]
fn main() {
    tractwarp::cli::run::run();
}

#[cfg(feature = "for-testing")]
fn main() {
    eprintln!(
        "Warning: The `for-testing` feature is enabled, which will clutter error messages\n\
         Tip: Use cargo flag --features=all-non-testing to include all features except `for-testing`"
    );
    tractwarp::cli::run::run();
}
