//! Binary entrypoint for the browser-hosted bar.

#[cfg(all(target_arch = "wasm32", feature = "csr"))]
fn main() {
    bar_site::mount();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!(
        "This binary is intended for the browser/WASM workflow. Build `bar_site_app` for wasm32 with the `csr` feature and load it from a page exposing `data-cozy-domain` and `data-cozy-token`."
    );
}
