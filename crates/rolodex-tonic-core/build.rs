/// Builds the gRPC client and server code for `proto/rolodex.proto` using
/// `tonic-prost-build`.
///
/// Besides the generated message types and the `PersonRegistry` service
/// bindings, a serialized file descriptor set is written to `OUT_DIR` so the
/// server can expose it through gRPC reflection.
///
/// # Panics
///
/// Panics if `OUT_DIR` is unset or code generation fails.
///
/// # Output
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("rolodex");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("rolodex_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    println!("cargo:rerun-if-changed=proto/rolodex.proto");

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/rolodex.proto"], &["proto"])
        .unwrap();
}
