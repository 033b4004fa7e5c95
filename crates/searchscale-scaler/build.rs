fn main() -> Result<(), Box<dyn std::error::Error>> {
    let protoc = protoc_bin_vendored::protoc_bin_path().map_err(|e| e.to_string())?;
    let mut config = prost_build::Config::new();
    config.protoc_executable(protoc);

    tonic_build::configure().compile_protos_with_config(
        config,
        &["proto/externalscaler.proto"],
        &["proto"],
    )?;
    Ok(())
}
