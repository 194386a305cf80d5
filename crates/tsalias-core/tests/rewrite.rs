//! Integration tests for whole-project rewrites.
//!
//! Each test lays out a compiled project on disk and runs the rewriter over it.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tsalias_core::{
    AliasRewriter, FnReplacer, ProjectConfig, ReplaceContext, ReplacerOption, ReplacerRegistry,
    RewriteError, rewrite_project, rewrite_project_with,
};

fn write(root: &Path, file: &str, content: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join(file)).unwrap()
}

#[tokio::test]
async fn test_rewrites_wildcard_alias_to_relative_path() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/widgets/button.js", "export default 1;\n");
    write(
        root,
        "dist/pages/home.js",
        "import x from '@app/widgets/button';\nconsole.log(x);\n",
    );

    let config = ProjectConfig::new(root)
        .with_base_url(".")
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);

    let summary = rewrite_project(&config).await.unwrap();
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.changed, 1);
    assert!(summary.is_success());
    assert_eq!(
        read(root, "dist/pages/home.js"),
        "import x from '../app/widgets/button';\nconsole.log(x);\n"
    );
}

#[tokio::test]
async fn test_second_run_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/a.js", "");
    write(
        root,
        "dist/index.js",
        "const a = require(\"@app/a\");\nexport * from '@app/a';\nimport './local';\n",
    );

    let config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);

    let first = rewrite_project(&config).await.unwrap();
    assert_eq!(first.changed, 1);
    let after_first = read(root, "dist/index.js");
    assert_eq!(
        after_first,
        "const a = require(\"./app/a\");\nexport * from './app/a';\nimport './local';\n"
    );

    let second = rewrite_project(&config).await.unwrap();
    assert_eq!(second.changed, 0);
    assert_eq!(read(root, "dist/index.js"), after_first);
}

#[tokio::test]
async fn test_falls_back_to_second_candidate() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/generated/schema.js", "");
    write(root, "dist/main.js", "import s from '#shared/schema';\n");

    let config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("#shared/*", ["src/handwritten/*", "src/generated/*"]);

    rewrite_project(&config).await.unwrap();
    assert_eq!(read(root, "dist/main.js"), "import s from './generated/schema';\n");
}

#[tokio::test]
async fn test_relative_and_package_imports_are_untouched() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let source = "import a from './a';\nimport b from '../b';\nimport React from 'react';\nimport c from '@app/missing';\n";
    write(root, "dist/nested/index.js", source);

    let config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);

    let summary = rewrite_project(&config).await.unwrap();
    assert_eq!(summary.changed, 0);
    assert_eq!(read(root, "dist/nested/index.js"), source);
}

#[tokio::test]
async fn test_monorepo_nested_output() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("app");
    write(&project, "dist/shared/src/util.js", "");
    write(&project, "dist/app/src/local.js", "");
    write(
        &project,
        "dist/app/src/index.js",
        "import { util } from '@shared/util';\nimport local from '@/local';\n",
    );

    let config = ProjectConfig::new(&project)
        .with_base_url(".")
        .with_out_dir("dist")
        .with_alias("@shared/*", ["../shared/src/*"])
        .with_alias("@/*", ["src/*"]);

    rewrite_project(&config).await.unwrap();
    assert_eq!(
        read(&project, "dist/app/src/index.js"),
        "import { util } from '../../shared/src/util';\nimport local from './local';\n"
    );
}

#[tokio::test]
async fn test_escaping_candidate_without_target_falls_through() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("app");
    write(&project, "dist/app/src/vendored/lib.js", "");
    write(&project, "dist/app/src/index.js", "import lib from '@lib/lib';\n");

    let config = ProjectConfig::new(&project)
        .with_out_dir("dist")
        .with_alias("@lib/*", ["../external/*", "src/vendored/*"]);

    let rewriter = AliasRewriter::prepare(&config).unwrap();
    let record = rewriter.trie().search("@lib/lib").unwrap();
    assert!(record.candidates[0].is_extra);
    assert!(!record.candidates[1].is_extra);

    rewrite_project(&config).await.unwrap();
    assert_eq!(
        read(&project, "dist/app/src/index.js"),
        "import lib from './vendored/lib';\n"
    );
}

#[tokio::test]
async fn test_declaration_dir_is_rewritten_too() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/x.js", "");
    write(root, "dist/index.js", "import x from '@app/x';\n");
    write(root, "types/app/x.d.ts", "");
    write(root, "types/index.d.ts", "import x from '@app/x';\nexport { x };\n");

    let mut config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);
    config.declaration_dir = Some("types".into());

    let summary = rewrite_project(&config).await.unwrap();
    assert_eq!(summary.changed, 2);
    assert_eq!(read(root, "dist/index.js"), "import x from './app/x';\n");
    assert_eq!(
        read(root, "types/index.d.ts"),
        "import x from './app/x';\nexport { x };\n"
    );
}

#[tokio::test]
async fn test_missing_declaration_dir_is_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/x.js", "");
    write(root, "dist/index.js", "import x from '@app/x';\n");

    let mut config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);
    config.declaration_dir = Some("types".into());

    let summary = rewrite_project(&config).await.unwrap();
    assert!(summary.is_success());
    assert_eq!((summary.scanned, summary.changed), (2, 1));
    assert_eq!(read(root, "dist/index.js"), "import x from './app/x';\n");
}

#[tokio::test]
async fn test_missing_out_dir_fails_before_declaration_dir() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "types/app/x.d.ts", "");
    write(root, "types/index.d.ts", "import x from '@app/x';\n");

    let mut config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);
    config.declaration_dir = Some("types".into());

    let err = rewrite_project(&config).await.unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("compilerOptions.outDir"));
    assert_eq!(read(root, "types/index.d.ts"), "import x from '@app/x';\n");
}

#[tokio::test]
async fn test_declaration_dir_rewriter_names_its_field() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("dist")).unwrap();

    let mut config = ProjectConfig::new(root).with_out_dir("dist");
    config.declaration_dir = Some("types".into());

    let rewriter = AliasRewriter::prepare_for_dir(
        &config,
        &ReplacerRegistry::new(),
        &root.join("types"),
    )
    .unwrap();
    let err = Arc::new(rewriter).rewrite_all().await.unwrap_err();
    assert!(err.to_string().contains("compilerOptions.declarationDir"));
}

#[tokio::test]
async fn test_declaration_dir_inside_out_dir_is_visited_twice() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/x.js", "");
    write(root, "dist/index.js", "import x from '@app/x';\n");
    write(root, "dist/types/app/x.d.ts", "");
    write(root, "dist/types/index.d.ts", "import x from '@app/x';\n");

    let mut config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);
    config.declaration_dir = Some("dist/types".into());

    let summary = rewrite_project(&config).await.unwrap();
    assert!(summary.is_success());
    // The declaration files are scanned by both passes but only the first
    // one finds an alias left to rewrite.
    assert_eq!((summary.scanned, summary.changed), (6, 2));
    assert_eq!(read(root, "dist/index.js"), "import x from './app/x';\n");
    assert_eq!(read(root, "dist/types/index.d.ts"), "import x from '../app/x';\n");
}

#[tokio::test]
async fn test_resolve_full_paths() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/a.js", "");
    write(root, "dist/lib/index.mjs", "");
    write(root, "dist/main.js", "import a from '@app/a';\nimport lib from './lib';\n");

    let mut config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);
    config.resolve_full_paths = true;

    rewrite_project(&config).await.unwrap();
    assert_eq!(
        read(root, "dist/main.js"),
        "import a from './app/a.js';\nimport lib from './lib/index.mjs';\n"
    );
}

#[tokio::test]
async fn test_base_url_imports_without_alias() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/services/api.js", "");
    write(root, "dist/pages/home.js", "import api from 'services/api';\n");

    let config = ProjectConfig::new(root).with_base_url(".").with_out_dir("dist");

    rewrite_project(&config).await.unwrap();
    assert_eq!(
        read(root, "dist/pages/home.js"),
        "import api from '../services/api';\n"
    );
}

#[tokio::test]
async fn test_node_modules_and_other_extensions_are_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/a.js", "");
    write(root, "dist/node_modules/pkg/index.js", "import a from '@app/a';\n");
    write(root, "dist/readme.md", "import a from '@app/a';\n");

    let config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);

    let summary = rewrite_project(&config).await.unwrap();
    assert_eq!(summary.scanned, 1);
    assert_eq!(
        read(root, "dist/node_modules/pkg/index.js"),
        "import a from '@app/a';\n"
    );
    assert_eq!(read(root, "dist/readme.md"), "import a from '@app/a';\n");
}

#[tokio::test]
async fn test_custom_input_glob() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/a.js", "");
    write(root, "dist/view.vue.js", "import a from '@app/a';\n");
    write(root, "dist/main.js", "import a from '@app/a';\n");

    let mut config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);
    config.file_extensions.input_glob = Some("vue.js".to_string());

    let summary = rewrite_project(&config).await.unwrap();
    assert_eq!(summary.scanned, 1);
    assert_eq!(read(root, "dist/view.vue.js"), "import a from './app/a';\n");
    assert_eq!(read(root, "dist/main.js"), "import a from '@app/a';\n");
}

#[tokio::test]
async fn test_user_replacer_runs_after_builtins() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/main.js", "import old from 'legacy-lib';\n");

    let mut registry = ReplacerRegistry::new();
    registry.register_replacer(Arc::new(FnReplacer::new(
        "legacy",
        |statement: &str, _: &ReplaceContext<'_>| Ok(statement.replace("legacy-lib", "modern-lib")),
    )));

    let mut config = ProjectConfig::new(root).with_out_dir("dist");
    config
        .replacers
        .insert("legacy".to_string(), ReplacerOption::enabled());
    config
        .replacers
        .insert("ghost".to_string(), ReplacerOption::enabled());

    let rewriter = AliasRewriter::prepare_with(&config, &registry).unwrap();
    assert_eq!(rewriter.replacer_names(), vec!["default", "baseUrl", "legacy"]);
    assert_eq!(rewriter.load_errors().len(), 1);
    assert_eq!(rewriter.load_errors()[0].name, "ghost");

    let summary = rewrite_project_with(&config, &registry).await.unwrap();
    assert_eq!(summary.changed, 1);
    assert_eq!(read(root, "dist/main.js"), "import old from 'modern-lib';\n");
}

#[tokio::test]
async fn test_rewrite_file_single_entry_point() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/a.js", "");
    write(root, "dist/main.js", "import a from '@app/a';\n");

    let config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);
    let rewriter = AliasRewriter::prepare(&config).unwrap();

    let main = rewriter.out_dir().join("main.js");
    assert!(rewriter.is_input(&main));
    assert!(rewriter.rewrite_file(&main).await.unwrap());
    assert!(!rewriter.rewrite_file(&main).await.unwrap());

    let err = rewriter
        .rewrite_file(&rewriter.out_dir().join("gone.js"))
        .await
        .unwrap_err();
    assert!(matches!(err, RewriteError::Io { .. }));
}

#[test]
fn test_rewrite_source_leaves_disk_alone() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/a.js", "");

    let config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);
    let rewriter = AliasRewriter::prepare(&config).unwrap();

    let file = rewriter.out_dir().join("virtual.js");
    let out = rewriter
        .rewrite_source(&file, "export { a } from \"@app/a\";")
        .unwrap();
    assert_eq!(out, "export { a } from \"./app/a\";");
    assert!(!file.exists());
}

#[tokio::test]
async fn test_missing_out_dir_is_fatal() {
    let temp = TempDir::new().unwrap();

    let err = rewrite_project(&ProjectConfig::new(temp.path())).await.unwrap_err();
    assert!(err.is_config());

    let config = ProjectConfig::new(temp.path()).with_out_dir("not-built");
    let err = rewrite_project(&config).await.unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn test_failing_file_does_not_stop_batch() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "dist/app/a.js", "");
    write(root, "dist/one.js", "import a from '@app/a';\n");
    write(root, "dist/two.js", "import a from '@app/a';\n");
    // Not valid UTF-8, so reading it as text fails
    let bad = root.join("dist/bad.js");
    fs::write(&bad, [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let config = ProjectConfig::new(root)
        .with_out_dir("dist")
        .with_alias("@app/*", ["src/app/*"]);

    let rewriter = Arc::new(AliasRewriter::prepare(&config).unwrap().with_concurrency(1));
    let summary = rewriter.rewrite_all().await.unwrap();
    assert_eq!(summary.scanned, 4);
    assert_eq!(summary.changed, 2);
    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].0.ends_with("bad.js"));
}
