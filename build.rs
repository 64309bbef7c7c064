use std::env;
use std::path::PathBuf;

// ffmpeg-sys-next locates FFmpeg on its own everywhere except Windows, where
// a vcpkg install is the usual source. Point the user at it when unset.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=gifmaker needs FFmpeg development libraries; set FFMPEG_DIR (or VCPKG_ROOT) before building on Windows."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate: PathBuf = [vcpkg_root.as_str(), "installed", triplet.as_str()]
        .iter()
        .collect();

    if candidate.is_dir() {
        println!(
            "cargo:warning=Found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to use it explicitly.",
            candidate.display(),
        );
    } else {
        println!(
            "cargo:warning=VCPKG_ROOT has no FFmpeg for triplet {triplet} (looked in {}).",
            candidate.display(),
        );
    }
}
