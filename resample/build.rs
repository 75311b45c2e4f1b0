fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOXR_LIB_DIR");

    // libsoxr is only linked when the native engine is requested.
    if std::env::var_os("CARGO_FEATURE_LIBSOXR").is_none() {
        return;
    }

    match std::env::var("SOXR_LIB_DIR") {
        Ok(dir) => println!("cargo:rustc-link-search=native={dir}"),
        Err(_) => {
            println!("cargo:rustc-link-search=native=/opt/homebrew/lib");
            println!("cargo:rustc-link-search=native=/usr/local/lib");
        }
    }
    println!("cargo:rustc-link-lib=soxr");
}
