//! Build script that reports on the native libraries and data files the crate uses.
//!
//! Nothing here fails the build: missing pieces are reported as cargo warnings
//! with a hint on how to install them.

use std::env;
use std::path::Path;
use std::process::Command;

const CASCADE_FILE: &str = "haarcascade_frontalface_default.xml";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    let opencv_prefix = check_opencv();
    check_cascade(opencv_prefix.as_deref());

    if env::var("TARGET").unwrap_or_default().contains("linux") {
        check_x11();
    }
}

fn pkg_config(args: &[&str]) -> Option<String> {
    let output = Command::new("pkg-config").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Returns the OpenCV install prefix when pkg-config knows it
fn check_opencv() -> Option<String> {
    for package in ["opencv4", "opencv"] {
        if let Some(version) = pkg_config(&["--modversion", package]) {
            println!("cargo:warning=Found OpenCV {version} ({package})");
            return pkg_config(&["--variable=prefix", package]);
        }
    }

    println!("cargo:warning=OpenCV not found via pkg-config; the opencv crate needs it to link.");
    println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev clang libclang-dev");
    println!("cargo:warning=On macOS: brew install opencv");
    None
}

fn check_cascade(opencv_prefix: Option<&str>) {
    println!("cargo:rerun-if-changed=assets/{CASCADE_FILE}");

    let mut candidates = vec![format!("assets/{CASCADE_FILE}")];
    if let Some(prefix) = opencv_prefix {
        candidates.push(format!("{prefix}/share/opencv4/haarcascades/{CASCADE_FILE}"));
        candidates.push(format!("{prefix}/share/opencv/haarcascades/{CASCADE_FILE}"));
    }

    match candidates.iter().find(|path| Path::new(path).exists()) {
        Some(path) => println!("cargo:warning=Haar cascade available at {path}"),
        None => {
            println!("cargo:warning=No {CASCADE_FILE} found; the cascade fallback detector will be disabled.");
            println!("cargo:warning=Copy it from OpenCV's data/haarcascades into assets/ or set models.face_cascade.");
        }
    }
}

fn check_x11() {
    if pkg_config(&["--exists", "x11"]).is_none() {
        println!("cargo:warning=X11 development files not found; cursor output needs a running X server.");
        println!("cargo:warning=On Ubuntu: sudo apt-get install libx11-dev");
    }
}
