use std::path::{Path, PathBuf};

use arch_lint::rules::{NoErrorSwallowing, NoSilentResultDrop};
use arch_lint::{Analyzer, Severity};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("workspace root")
        .to_path_buf()
}

/// Engine and probe failures must reach the reaper or the exit code, never
/// vanish into `.ok()` or `let _ =`. Only the three crates' `src/` trees are
/// checked.
#[test]
fn crate_sources_never_swallow_errors() {
    let root = workspace_root();
    let analyzer = Analyzer::builder()
        .root(&root)
        .exclude("**/target/**")
        .exclude("crates/*/tests/**")
        .exclude("examples/**")
        .rule(NoErrorSwallowing::new())
        .rule(NoSilentResultDrop::new())
        .build()
        .expect("build analyzer");

    let result = analyzer.analyze().expect("analyze");

    if result.has_violations_at(Severity::Warning) {
        panic!("{}", result.format_test_report(Severity::Warning));
    }
}
