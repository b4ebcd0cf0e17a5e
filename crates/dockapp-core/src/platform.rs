/// Host OS in engine platform vocabulary.
pub fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Host architecture in engine platform vocabulary.
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

pub fn host_build_args() -> [String; 2] {
    [
        format!("HOSTOS={}", host_os()),
        format!("HOSTARCH={}", host_arch()),
    ]
}
