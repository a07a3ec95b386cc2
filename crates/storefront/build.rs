//! Build script for the storefront crate.
//!
//! Fingerprints the shop stylesheet so templates can link a content-addressed
//! copy that is safe to cache forever.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_css();
}

/// Hash `shop.css` and copy it to `static/css/derived/shop.{hash}.css`.
///
/// Sets `CSS_HASH` for use with `env!("CSS_HASH")`. An empty hash makes the
/// templates fall back to the unhashed file.
fn hash_css() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/shop.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    let content = match fs::read(&css_path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read shop.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
            return;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash: String = digest.chars().take(8).collect();

    let derived_dir = Path::new(&manifest_dir).join("static/css/derived");
    let copied = fs::create_dir_all(&derived_dir).and_then(|()| {
        fs::copy(&css_path, derived_dir.join(format!("shop.{short_hash}.css")))
    });

    match copied {
        Ok(_) => println!("cargo:rustc-env=CSS_HASH={short_hash}"),
        Err(e) => {
            println!("cargo:warning=Could not write hashed shop.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
        }
    }
}
