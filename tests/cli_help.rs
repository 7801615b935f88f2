use std::process::Command;

// Every binary in the crate.
fn binaries() -> Vec<&'static str> {
    vec![
        env!("CARGO_BIN_EXE_chromoplot"),
        env!("CARGO_BIN_EXE_chromoplot_freq"),
        env!("CARGO_BIN_EXE_chromoplot_recolor"),
        env!("CARGO_BIN_EXE_chromoplot_crossplan"),
        env!("CARGO_BIN_EXE_chromoplot_landpie"),
    ]
}

#[test]
fn help_prints_usage_and_exits_cleanly() {
    for bin in binaries() {
        let out = Command::new(bin)
            .arg("--help")
            .output()
            .unwrap_or_else(|e| panic!("could not run {bin}: {e}"));
        assert!(out.status.success(), "{bin} --help exited with failure");
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains("Usage"), "{bin} --help printed: {stderr}");
    }
}

#[test]
fn excess_positional_arguments_are_an_error() {
    let out = Command::new(env!("CARGO_BIN_EXE_chromoplot"))
        .args(["a", "b", "c"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Expected at most"), "{stderr}");
}
