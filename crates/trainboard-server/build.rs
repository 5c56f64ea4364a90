// Embedded assets come from frontend/dist, which only exists after
// `trunk build`. Seed it with a stub page so a plain `cargo build` of the
// server still succeeds.

use std::path::Path;

const STUB_PAGE: &str = "<!doctype html><title>Trainboard</title>\n\
<p>Frontend not built. Run <code>trunk build</code> in frontend/.</p>\n";

fn main() {
    let dist = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../frontend/dist");
    println!("cargo:rerun-if-changed=../../frontend/dist");

    let index = dist.join("index.html");
    if index.exists() {
        return;
    }
    if let Err(e) = std::fs::create_dir_all(&dist).and_then(|_| std::fs::write(&index, STUB_PAGE)) {
        panic!("cannot seed {}: {}", index.display(), e);
    }
}
